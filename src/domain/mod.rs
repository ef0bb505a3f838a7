//! Domain models for npuctl
//!
//! Normalized data shared by every generation backend. Values arriving from
//! the driver are converted into these types at the backend boundary.

pub mod chip;
pub mod device;
pub mod memory;
pub mod vdev;

pub use chip::{ChipClass, ChipInfo, DeviceType};
pub use device::{DeviceComponent, ErrorCodes, HealthState};
pub use memory::{HbmInfo, MemoryInfo};
pub use vdev::{
    ComputingResource, SocFreeResource, SocTotalResource, VDevQueryInfo, VDevStatus,
    VirtualDeviceInfo,
};
