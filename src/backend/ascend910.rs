//! Ascend 910 family (training)
//!
//! HBM equipped, RoCE networked, vNPU capable.

use super::{power_watts, NpuBackend, VDevTemplate};
use crate::dcmi::DcmiDriver;
use crate::domain::{DeviceType, HbmInfo};
use crate::error::DcmiError;

use std::net::IpAddr;

const TEMPLATES: &[VDevTemplate] = &[(2, "vir02"), (4, "vir04"), (8, "vir08"), (16, "vir16")];

pub struct Ascend910<D> {
    driver: D,
}

impl<D: DcmiDriver> Ascend910<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

impl<D: DcmiDriver> NpuBackend for Ascend910<D> {
    fn device_type(&self) -> DeviceType {
        DeviceType::Ascend910
    }

    fn driver(&self) -> &dyn DcmiDriver {
        &self.driver
    }

    fn driver_mut(&mut self) -> &mut dyn DcmiDriver {
        &mut self.driver
    }

    fn has_hbm(&self) -> bool {
        true
    }

    fn vdev_templates(&self) -> &'static [VDevTemplate] {
        TEMPLATES
    }

    fn network_health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.driver.network_health(card_id, device_id)
    }

    fn power(&self, card_id: u32, device_id: u32) -> Result<f32, DcmiError> {
        self.driver.power(card_id, device_id).map(power_watts)
    }

    fn hbm_info(&self, card_id: u32, device_id: u32) -> Result<HbmInfo, DcmiError> {
        self.driver.hbm_info(card_id, device_id)
    }

    fn ip_address(&self, card_id: u32, device_id: u32) -> Result<IpAddr, DcmiError> {
        self.driver.ip_address(card_id, device_id)
    }
}
