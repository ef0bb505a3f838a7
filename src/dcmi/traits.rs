//! Trait definitions for the DCMI driver boundary
//!
//! These traits abstract over the vendor library to enable testing with fakes.

use crate::domain::{ChipInfo, DeviceComponent, ErrorCodes, HbmInfo, MemoryInfo};
use crate::error::DcmiError;

use std::net::IpAddr;

/// Number of virtual device slots in the native report
pub const MAX_VDEV_NUM: usize = 16;

/// Raw virtual device report as laid out by the driver
///
/// Slots are parallel arrays indexed together; only the first `vdev_num`
/// slots carry data. This shape must not travel past [`crate::vdev`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawVDevInfo {
    /// Number of populated slots claimed by the driver
    pub vdev_num: u32,
    /// AI cores not allocated to any virtual device
    pub core_num_unused: u32,
    pub status: [u32; MAX_VDEV_NUM],
    pub vdev_id: [u32; MAX_VDEV_NUM],
    pub vf_id: [u32; MAX_VDEV_NUM],
    pub cid: [u64; MAX_VDEV_NUM],
    /// AI cores allocated to each slot
    pub core_num: [u32; MAX_VDEV_NUM],
}

/// Raw driver operations
///
/// Every per-device primitive is keyed by (card_id, device_id). Units are the
/// driver's own; converting them is the backend's job.
pub trait DcmiDriver: Send + Sync {
    /// Load and initialize the driver
    fn init(&mut self) -> Result<(), DcmiError>;

    /// Release the driver
    fn shutdown(&mut self) -> Result<(), DcmiError>;

    // Topology
    /// List card IDs
    fn card_list(&self) -> Result<Vec<u32>, DcmiError>;

    /// Number of devices on a card
    fn device_num_in_card(&self, card_id: u32) -> Result<u32, DcmiError>;

    /// Chip identity of a device
    fn chip_info(&self, card_id: u32, device_id: u32) -> Result<ChipInfo, DcmiError>;

    // Addressing
    /// Map a logical ID to its (card_id, device_id) slot
    fn card_id_device_id(&self, logic_id: u32) -> Result<(u32, u32), DcmiError>;

    /// Map a slot to its logical ID
    fn logic_id(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError>;

    /// Map a logical ID to a physical ID
    fn physic_id_from_logic_id(&self, logic_id: u32) -> Result<u32, DcmiError>;

    /// Map a physical ID to a logical ID
    fn logic_id_from_physic_id(&self, physic_id: u32) -> Result<u32, DcmiError>;

    // Telemetry
    /// Raw health code
    fn health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError>;

    /// Raw network (RoCE link) health code
    fn network_health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError>;

    /// Utilization percentage of a component
    fn utilization_rate(
        &self,
        card_id: u32,
        device_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DcmiError>;

    /// Temperature in Celsius
    fn temperature(&self, card_id: u32, device_id: u32) -> Result<i32, DcmiError>;

    /// Voltage in units of 0.01 V
    fn voltage(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError>;

    /// Power draw in units of 0.1 W
    fn power(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError>;

    /// Frequency of a component in MHz
    fn frequency(
        &self,
        card_id: u32,
        device_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DcmiError>;

    /// DDR memory snapshot
    fn memory_info(&self, card_id: u32, device_id: u32) -> Result<MemoryInfo, DcmiError>;

    /// HBM snapshot
    fn hbm_info(&self, card_id: u32, device_id: u32) -> Result<HbmInfo, DcmiError>;

    /// Active error codes
    fn error_codes(&self, card_id: u32, device_id: u32) -> Result<ErrorCodes, DcmiError>;

    /// Address of the device's RoCE port
    fn ip_address(&self, card_id: u32, device_id: u32) -> Result<IpAddr, DcmiError>;

    // Virtual devices
    /// Create a virtual device from a named template, returning its ID
    fn create_vdevice(&self, card_id: u32, device_id: u32, template: &str)
        -> Result<u32, DcmiError>;

    /// Read the raw virtual device report
    fn vdevice_info(&self, card_id: u32, device_id: u32) -> Result<RawVDevInfo, DcmiError>;

    /// Destroy a virtual device
    fn destroy_vdevice(&self, card_id: u32, device_id: u32, vdev_id: u32)
        -> Result<(), DcmiError>;
}
