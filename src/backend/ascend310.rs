//! Ascend 310 family (edge inference)
//!
//! The smallest generation: no HBM, no RoCE, no power sensor and no vNPU.
//! Only the shared defaults apply.

use super::NpuBackend;
use crate::dcmi::DcmiDriver;
use crate::domain::DeviceType;

pub struct Ascend310<D> {
    driver: D,
}

impl<D: DcmiDriver> Ascend310<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

impl<D: DcmiDriver> NpuBackend for Ascend310<D> {
    fn device_type(&self) -> DeviceType {
        DeviceType::Ascend310
    }

    fn driver(&self) -> &dyn DcmiDriver {
        &self.driver
    }

    fn driver_mut(&mut self) -> &mut dyn DcmiDriver {
        &mut self.driver
    }
}
