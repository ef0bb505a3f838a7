//! Generation backends
//!
//! Each supported accelerator generation implements [`NpuBackend`] against
//! the raw DCMI driver. Defaults cover the behavior every generation shares;
//! operations that only some generations have default to `NotSupported` and
//! are overridden where the hardware provides them.

pub mod ascend310;
pub mod ascend310p;
pub mod ascend910;

pub use ascend310::Ascend310;
pub use ascend310p::Ascend310P;
pub use ascend910::Ascend910;

use crate::dcmi::{DcmiDriver, RawVDevInfo};
use crate::domain::{
    ChipInfo, DeviceComponent, DeviceType, ErrorCodes, HbmInfo, MemoryInfo,
};
use crate::error::DcmiError;

use std::net::IpAddr;

/// Driver voltage unit is 0.01 V
const VOLTAGE_UNIT: f32 = 0.01;

/// Driver power unit is 0.1 W
const POWER_UNIT: f32 = 0.1;

/// A virtual device template: AI core count and native template name
pub type VDevTemplate = (u32, &'static str);

pub(crate) fn unsupported<T>(device_type: DeviceType, operation: &str) -> Result<T, DcmiError> {
    Err(DcmiError::NotSupported(format!(
        "{} is not available on {}",
        operation, device_type
    )))
}

/// Device operations shared by every generation
///
/// Per-device operations are addressed by (card_id, device_id); logical ID
/// translation happens in the device manager before any of these run.
pub trait NpuBackend: Send + Sync {
    /// Generation handled by this backend
    fn device_type(&self) -> DeviceType;

    /// Underlying driver
    fn driver(&self) -> &dyn DcmiDriver;

    /// Underlying driver, mutable for lifecycle calls
    fn driver_mut(&mut self) -> &mut dyn DcmiDriver;

    /// Whether the chip carries HBM
    fn has_hbm(&self) -> bool {
        false
    }

    /// Virtual device templates, empty when vNPU is not available
    fn vdev_templates(&self) -> &'static [VDevTemplate] {
        &[]
    }

    // Lifecycle
    fn init(&mut self) -> Result<(), DcmiError> {
        self.driver_mut().init()
    }

    fn shutdown(&mut self) -> Result<(), DcmiError> {
        self.driver_mut().shutdown()
    }

    // Topology and addressing
    fn card_list(&self) -> Result<Vec<u32>, DcmiError> {
        self.driver().card_list()
    }

    /// Total devices across all cards
    fn device_count(&self) -> Result<u32, DcmiError> {
        let driver = self.driver();
        driver.card_list()?.into_iter().try_fold(0u32, |total, card_id| {
            Ok(total.saturating_add(driver.device_num_in_card(card_id)?))
        })
    }

    /// Logical IDs of every device, in card/device order
    fn logic_id_list(&self) -> Result<Vec<u32>, DcmiError> {
        let driver = self.driver();
        let mut ids = Vec::new();
        for card_id in driver.card_list()? {
            for device_id in 0..driver.device_num_in_card(card_id)? {
                ids.push(driver.logic_id(card_id, device_id)?);
            }
        }
        Ok(ids)
    }

    fn card_id_device_id(&self, logic_id: u32) -> Result<(u32, u32), DcmiError> {
        self.driver().card_id_device_id(logic_id)
    }

    fn logic_id(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.driver().logic_id(card_id, device_id)
    }

    fn physic_id_from_logic_id(&self, logic_id: u32) -> Result<u32, DcmiError> {
        self.driver().physic_id_from_logic_id(logic_id)
    }

    fn logic_id_from_physic_id(&self, physic_id: u32) -> Result<u32, DcmiError> {
        self.driver().logic_id_from_physic_id(physic_id)
    }

    // Telemetry
    fn chip_info(&self, card_id: u32, device_id: u32) -> Result<ChipInfo, DcmiError> {
        self.driver().chip_info(card_id, device_id)
    }

    fn health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.driver().health(card_id, device_id)
    }

    fn network_health(&self, _card_id: u32, _device_id: u32) -> Result<u32, DcmiError> {
        unsupported(self.device_type(), "network health")
    }

    fn utilization_rate(
        &self,
        card_id: u32,
        device_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DcmiError> {
        if component.requires_hbm() && !self.has_hbm() {
            return unsupported(self.device_type(), &format!("{} utilization", component));
        }
        self.driver().utilization_rate(card_id, device_id, component)
    }

    fn temperature(&self, card_id: u32, device_id: u32) -> Result<i32, DcmiError> {
        self.driver().temperature(card_id, device_id)
    }

    /// Voltage in volts
    fn voltage(&self, card_id: u32, device_id: u32) -> Result<f32, DcmiError> {
        Ok(self.driver().voltage(card_id, device_id)? as f32 * VOLTAGE_UNIT)
    }

    /// Power draw in watts
    fn power(&self, _card_id: u32, _device_id: u32) -> Result<f32, DcmiError> {
        unsupported(self.device_type(), "power")
    }

    fn frequency(
        &self,
        card_id: u32,
        device_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DcmiError> {
        if component.requires_hbm() && !self.has_hbm() {
            return unsupported(self.device_type(), &format!("{} frequency", component));
        }
        self.driver().frequency(card_id, device_id, component)
    }

    fn memory_info(&self, card_id: u32, device_id: u32) -> Result<MemoryInfo, DcmiError> {
        self.driver().memory_info(card_id, device_id)
    }

    fn hbm_info(&self, _card_id: u32, _device_id: u32) -> Result<HbmInfo, DcmiError> {
        unsupported(self.device_type(), "HBM info")
    }

    fn error_codes(&self, card_id: u32, device_id: u32) -> Result<ErrorCodes, DcmiError> {
        self.driver().error_codes(card_id, device_id)
    }

    fn ip_address(&self, _card_id: u32, _device_id: u32) -> Result<IpAddr, DcmiError> {
        unsupported(self.device_type(), "IP address")
    }

    // Virtual devices
    /// Create a virtual device with `ai_core` AI cores
    fn create_vdevice(&self, card_id: u32, device_id: u32, ai_core: u32) -> Result<u32, DcmiError> {
        let template = template_for(self.device_type(), self.vdev_templates(), ai_core)?;
        self.driver().create_vdevice(card_id, device_id, template)
    }

    fn vdevice_info(&self, card_id: u32, device_id: u32) -> Result<RawVDevInfo, DcmiError> {
        if self.vdev_templates().is_empty() {
            return unsupported(self.device_type(), "virtual devices");
        }
        self.driver().vdevice_info(card_id, device_id)
    }

    fn destroy_vdevice(&self, card_id: u32, device_id: u32, vdev_id: u32) -> Result<(), DcmiError> {
        if self.vdev_templates().is_empty() {
            return unsupported(self.device_type(), "virtual devices");
        }
        self.driver().destroy_vdevice(card_id, device_id, vdev_id)
    }
}

/// Convert a raw power reading to watts
pub(crate) fn power_watts(raw: u32) -> f32 {
    raw as f32 * POWER_UNIT
}

/// Pick the template that allocates exactly `ai_core` cores
fn template_for(
    device_type: DeviceType,
    templates: &'static [VDevTemplate],
    ai_core: u32,
) -> Result<&'static str, DcmiError> {
    if templates.is_empty() {
        return unsupported(device_type, "virtual devices");
    }
    templates
        .iter()
        .find(|(cores, _)| *cores == ai_core)
        .map(|&(_, name)| name)
        .ok_or_else(|| {
            let allowed: Vec<String> = templates.iter().map(|(c, _)| c.to_string()).collect();
            DcmiError::InvalidArgument(format!(
                "{} AI cores is not a valid {} vNPU size (allowed: {})",
                ai_core,
                device_type,
                allowed.join(", ")
            ))
        })
}

/// The closed set of generation backends
pub enum Backend<D: DcmiDriver> {
    Ascend910(Ascend910<D>),
    Ascend310P(Ascend310P<D>),
    Ascend310(Ascend310<D>),
}

impl<D: DcmiDriver> Backend<D> {
    /// Construct the backend for a detected generation
    pub fn new(device_type: DeviceType, driver: D) -> Self {
        match device_type {
            DeviceType::Ascend910 => Self::Ascend910(Ascend910::new(driver)),
            DeviceType::Ascend310P => Self::Ascend310P(Ascend310P::new(driver)),
            DeviceType::Ascend310 => Self::Ascend310(Ascend310::new(driver)),
        }
    }

    /// Borrow as the capability interface
    pub fn get(&self) -> &dyn NpuBackend {
        match self {
            Self::Ascend910(b) => b,
            Self::Ascend310P(b) => b,
            Self::Ascend310(b) => b,
        }
    }

    /// Mutably borrow as the capability interface
    pub fn get_mut(&mut self) -> &mut dyn NpuBackend {
        match self {
            Self::Ascend910(b) => b,
            Self::Ascend310P(b) => b,
            Self::Ascend310(b) => b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FakeDevice, FakeDriver};

    fn make_backend(device_type: DeviceType) -> (Backend<FakeDriver>, FakeDriver) {
        let driver = FakeDriver::new()
            .with_card(0, vec![FakeDevice::new(0, ChipInfo::new("Ascend", "910B", "V1"))]);
        (Backend::new(device_type, driver.clone()), driver)
    }

    #[test]
    fn test_factory_maps_every_type() {
        for device_type in DeviceType::ALL {
            let (backend, _) = make_backend(device_type);
            assert_eq!(backend.get().device_type(), device_type);
        }
    }

    #[test]
    fn test_voltage_conversion() {
        let (backend, _) = make_backend(DeviceType::Ascend310);
        // FakeDevice reports 85 (0.01 V units)
        let volts = backend.get().voltage(0, 0).unwrap();
        assert!((volts - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_power_conversion() {
        assert!((power_watts(725) - 72.5).abs() < 1e-4);
    }

    #[test]
    fn test_hbm_component_gated() {
        let (backend, driver) = make_backend(DeviceType::Ascend310P);
        let err = backend
            .get()
            .utilization_rate(0, 0, DeviceComponent::Hbm)
            .unwrap_err();
        assert!(matches!(err, DcmiError::NotSupported(_)));
        assert_eq!(driver.calls("utilization_rate"), 0);

        let (backend, driver) = make_backend(DeviceType::Ascend910);
        assert!(backend
            .get()
            .utilization_rate(0, 0, DeviceComponent::Hbm)
            .is_ok());
        assert_eq!(driver.calls("utilization_rate"), 1);
    }

    #[test]
    fn test_template_lookup() {
        const TEMPLATES: &[VDevTemplate] = &[(2, "vir02"), (4, "vir04")];
        assert_eq!(
            template_for(DeviceType::Ascend910, TEMPLATES, 4).unwrap(),
            "vir04"
        );
        let err = template_for(DeviceType::Ascend910, TEMPLATES, 3).unwrap_err();
        assert!(err.to_string().contains("allowed: 2, 4"));
        assert!(matches!(
            template_for(DeviceType::Ascend310, &[], 1),
            Err(DcmiError::NotSupported(_))
        ));
    }

    #[test]
    fn test_device_count_and_logic_ids() {
        let driver = FakeDriver::new()
            .with_card(0, vec![FakeDevice::new(0, ChipInfo::new("Ascend", "310P3", "V1"))])
            .with_card(
                1,
                vec![
                    FakeDevice::new(1, ChipInfo::new("Ascend", "310P3", "V1")),
                    FakeDevice::new(2, ChipInfo::new("Ascend", "310P3", "V1")),
                ],
            );
        let backend = Backend::new(DeviceType::Ascend310P, driver);
        assert_eq!(backend.get().device_count().unwrap(), 3);
        assert_eq!(backend.get().logic_id_list().unwrap(), vec![0, 1, 2]);
    }
}
