//! Device manager
//!
//! The single entry point consumers use. It detects the installed generation,
//! builds the matching backend and forwards every operation to it. Logical
//! device IDs are translated to (card_id, device_id) here and only here, and
//! every driver failure comes back as a [`DeviceError`] naming the operation
//! and the device it was addressed to.

use crate::backend::{Backend, NpuBackend};
use crate::dcmi::DcmiDriver;
use crate::detect;
use crate::domain::{
    ChipClass, ChipInfo, DeviceComponent, DeviceType, ErrorCodes, HbmInfo, MemoryInfo,
    VirtualDeviceInfo,
};
use crate::error::{DcmiError, DeviceContext, DeviceError};
use crate::vdev;

use std::fmt;
use std::net::IpAddr;

/// Wrap and log a failed backend call
fn call_failed(operation: &'static str, context: DeviceContext, source: DcmiError) -> DeviceError {
    let err = DeviceError::DriverCallFailed {
        operation,
        context,
        source,
    };
    log::error!("{}", err);
    err
}

/// Wrap and log a failed address translation
fn translation_failed(context: DeviceContext, source: DcmiError) -> DeviceError {
    let err = DeviceError::AddressTranslationFailed { context, source };
    log::error!("{}", err);
    err
}

/// Uniform device interface over every supported generation
pub struct DeviceManager<D: DcmiDriver> {
    backend: Backend<D>,
    chip: ChipInfo,
}

impl<D: DcmiDriver> fmt::Debug for DeviceManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceManager")
            .field("device_type", &self.device_type())
            .field("chip", &self.chip)
            .finish_non_exhaustive()
    }
}

impl<D: DcmiDriver> DeviceManager<D> {
    /// Detect the chip, select its backend and initialize it
    ///
    /// When `expected` is set, a different detected generation is an error
    /// rather than a silent switch. No manager is returned unless the backend
    /// initialized successfully.
    pub fn auto_init(mut driver: D, expected: Option<DeviceType>) -> Result<Self, DeviceError> {
        let chip = detect::detect(&mut driver)?;

        let detected = match chip.class() {
            ChipClass::Supported(device_type) => device_type,
            ChipClass::Unsupported => {
                return Err(DeviceError::Unsupported {
                    chip_name: chip.name,
                })
            }
        };

        if let Some(expected) = expected {
            if expected != detected {
                return Err(DeviceError::TypeMismatch { expected, detected });
            }
        }

        let mut backend = Backend::new(detected, driver);
        backend.get_mut().init().map_err(DeviceError::InitFailed)?;

        log::info!("Device manager ready for {} ({})", detected, chip);
        Ok(Self { backend, chip })
    }

    /// Generation of the managed devices
    pub fn device_type(&self) -> DeviceType {
        self.backend().device_type()
    }

    /// Chip identity found during detection
    pub fn detected_chip(&self) -> &ChipInfo {
        &self.chip
    }

    /// Whether the managed generation carries HBM
    pub fn has_hbm(&self) -> bool {
        self.backend().has_hbm()
    }

    fn backend(&self) -> &dyn NpuBackend {
        self.backend.get()
    }

    /// Translate a logical ID to its (card_id, device_id) slot
    pub fn card_id_device_id(&self, logic_id: u32) -> Result<(u32, u32), DeviceError> {
        self.backend()
            .card_id_device_id(logic_id)
            .map_err(|source| translation_failed(DeviceContext::Logic(logic_id), source))
    }

    /// Run a per-device operation addressed by logical ID
    fn on_device<T, F>(&self, operation: &'static str, logic_id: u32, f: F) -> Result<T, DeviceError>
    where
        F: FnOnce(&dyn NpuBackend, u32, u32) -> Result<T, DcmiError>,
    {
        let (card_id, device_id) = self.card_id_device_id(logic_id)?;
        f(self.backend(), card_id, device_id)
            .map_err(|source| call_failed(operation, DeviceContext::Logic(logic_id), source))
    }

    /// Total devices on the host
    pub fn device_count(&self) -> Result<u32, DeviceError> {
        self.backend()
            .device_count()
            .map_err(|source| call_failed("get device count", DeviceContext::Host, source))
    }

    /// Card IDs on the host
    pub fn card_list(&self) -> Result<Vec<u32>, DeviceError> {
        self.backend()
            .card_list()
            .map_err(|source| call_failed("get card list", DeviceContext::Host, source))
    }

    /// Logical IDs of every device on the host
    pub fn device_list(&self) -> Result<Vec<u32>, DeviceError> {
        self.backend()
            .logic_id_list()
            .map_err(|source| call_failed("get device list", DeviceContext::Host, source))
    }

    pub fn health(&self, logic_id: u32) -> Result<u32, DeviceError> {
        self.on_device("get health", logic_id, |b, c, d| b.health(c, d))
    }

    pub fn network_health(&self, logic_id: u32) -> Result<u32, DeviceError> {
        self.on_device("get network health", logic_id, |b, c, d| {
            b.network_health(c, d)
        })
    }

    /// Utilization percentage of one component
    pub fn utilization_rate(
        &self,
        logic_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DeviceError> {
        self.on_device("get utilization rate", logic_id, |b, c, d| {
            b.utilization_rate(c, d, component)
        })
    }

    /// Temperature in Celsius
    pub fn temperature(&self, logic_id: u32) -> Result<i32, DeviceError> {
        self.on_device("get temperature", logic_id, |b, c, d| b.temperature(c, d))
    }

    /// Voltage in volts
    pub fn voltage(&self, logic_id: u32) -> Result<f32, DeviceError> {
        self.on_device("get voltage", logic_id, |b, c, d| b.voltage(c, d))
    }

    /// Power draw in watts
    pub fn power(&self, logic_id: u32) -> Result<f32, DeviceError> {
        self.on_device("get power", logic_id, |b, c, d| b.power(c, d))
    }

    /// Frequency of one component in MHz
    pub fn frequency(&self, logic_id: u32, component: DeviceComponent) -> Result<u32, DeviceError> {
        self.on_device("get frequency", logic_id, |b, c, d| {
            b.frequency(c, d, component)
        })
    }

    pub fn memory_info(&self, logic_id: u32) -> Result<MemoryInfo, DeviceError> {
        self.on_device("get memory info", logic_id, |b, c, d| b.memory_info(c, d))
    }

    pub fn hbm_info(&self, logic_id: u32) -> Result<HbmInfo, DeviceError> {
        self.on_device("get HBM info", logic_id, |b, c, d| b.hbm_info(c, d))
    }

    pub fn error_codes(&self, logic_id: u32) -> Result<ErrorCodes, DeviceError> {
        self.on_device("get error codes", logic_id, |b, c, d| b.error_codes(c, d))
    }

    pub fn chip_info(&self, logic_id: u32) -> Result<ChipInfo, DeviceError> {
        self.on_device("get chip info", logic_id, |b, c, d| b.chip_info(c, d))
    }

    pub fn ip_address(&self, logic_id: u32) -> Result<IpAddr, DeviceError> {
        self.on_device("get IP address", logic_id, |b, c, d| b.ip_address(c, d))
    }

    pub fn physic_id_from_logic_id(&self, logic_id: u32) -> Result<u32, DeviceError> {
        self.on_device("get physic id", logic_id, |b, _, _| {
            b.physic_id_from_logic_id(logic_id)
        })
    }

    pub fn logic_id_from_physic_id(&self, physic_id: u32) -> Result<u32, DeviceError> {
        self.backend()
            .logic_id_from_physic_id(physic_id)
            .map_err(|source| translation_failed(DeviceContext::Physic(physic_id), source))
    }

    /// Logical ID of a (card_id, device_id) slot
    pub fn logic_id(&self, card_id: u32, device_id: u32) -> Result<u32, DeviceError> {
        self.backend()
            .logic_id(card_id, device_id)
            .map_err(|source| translation_failed(DeviceContext::Slot { card_id, device_id }, source))
    }

    /// Create a virtual device with `ai_core` AI cores, returning its ID
    pub fn create_vdevice(&self, logic_id: u32, ai_core: u32) -> Result<u32, DeviceError> {
        let vdev_id = self.on_device("create virtual device", logic_id, |b, c, d| {
            b.create_vdevice(c, d, ai_core)
        })?;
        log::info!(
            "Created vdev {} with {} AI cores on logicID({})",
            vdev_id,
            ai_core,
            logic_id
        );
        Ok(vdev_id)
    }

    /// Current resource split between free capacity and virtual devices
    pub fn virtual_device_info(&self, logic_id: u32) -> Result<VirtualDeviceInfo, DeviceError> {
        let raw = self.on_device("get virtual device info", logic_id, |b, c, d| {
            b.vdevice_info(c, d)
        })?;
        Ok(vdev::translate(&raw))
    }

    /// Destroy a virtual device
    pub fn destroy_vdevice(&self, logic_id: u32, vdev_id: u32) -> Result<(), DeviceError> {
        self.on_device("destroy virtual device", logic_id, |b, c, d| {
            b.destroy_vdevice(c, d, vdev_id)
        })?;
        log::info!("Destroyed vdev {} on logicID({})", vdev_id, logic_id);
        Ok(())
    }

    /// Shut the driver down, consuming the manager
    pub fn shutdown(mut self) -> Result<(), DeviceError> {
        self.backend
            .get_mut()
            .shutdown()
            .map_err(DeviceError::ShutdownFailed)?;
        log::debug!("Device manager shut down");
        Ok(())
    }
}
