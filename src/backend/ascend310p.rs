//! Ascend 310P family (inference)

use super::{power_watts, NpuBackend, VDevTemplate};
use crate::dcmi::DcmiDriver;
use crate::domain::DeviceType;
use crate::error::DcmiError;

const TEMPLATES: &[VDevTemplate] = &[(1, "vir01"), (2, "vir02"), (4, "vir04")];

pub struct Ascend310P<D> {
    driver: D,
}

impl<D: DcmiDriver> Ascend310P<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

impl<D: DcmiDriver> NpuBackend for Ascend310P<D> {
    fn device_type(&self) -> DeviceType {
        DeviceType::Ascend310P
    }

    fn driver(&self) -> &dyn DcmiDriver {
        &self.driver
    }

    fn driver_mut(&mut self) -> &mut dyn DcmiDriver {
        &mut self.driver
    }

    fn vdev_templates(&self) -> &'static [VDevTemplate] {
        TEMPLATES
    }

    fn power(&self, card_id: u32, device_id: u32) -> Result<f32, DcmiError> {
        self.driver.power(card_id, device_id).map(power_watts)
    }
}
