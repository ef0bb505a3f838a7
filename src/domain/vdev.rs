//! Virtual device (vNPU) resource model
//!
//! Normalized view of how a physical device's compute units are split
//! between free capacity and allocated virtual devices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute resource quanta
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputingResource {
    /// AI core count (the compute unit)
    pub ai_core: u32,
}

/// Lifecycle status of a virtual device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VDevStatus {
    /// Allocated but not bound to a container
    Created,
    /// Bound to a running container
    InUse,
    /// Status code outside the documented range
    Other(u32),
}

impl VDevStatus {
    /// Decode a raw driver status code
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Created,
            1 => Self::InUse,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for VDevStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::InUse => write!(f, "in-use"),
            Self::Other(code) => write!(f, "status({})", code),
        }
    }
}

/// One allocated virtual device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VDevQueryInfo {
    pub vdev_id: u32,
    pub status: VDevStatus,
    /// Virtual function backing this device
    pub vfid: u32,
    /// Container bound to this device, 0 when unbound
    pub container_id: u64,
    pub computing: ComputingResource,
}

impl VDevQueryInfo {
    /// Whether a container currently holds this device
    pub fn is_container_used(&self) -> bool {
        self.status == VDevStatus::InUse || self.container_id != 0
    }
}

impl fmt::Display for VDevQueryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vdev {} (vf {}): {} AI cores, {}",
            self.vdev_id, self.vfid, self.computing.ai_core, self.status
        )
    }
}

/// Total resource of the physical device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocTotalResource {
    pub vdev_num: u32,
    pub vdev_ids: Vec<u32>,
    pub computing: ComputingResource,
}

/// Unallocated resource of the physical device
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SocFreeResource {
    pub computing: ComputingResource,
}

/// Resource accounting for one physical device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualDeviceInfo {
    pub total: SocTotalResource,
    pub free: SocFreeResource,
    pub vdevices: Vec<VDevQueryInfo>,
}

impl VirtualDeviceInfo {
    /// Total AI cores of the physical device
    pub fn core_count(&self) -> u32 {
        self.total.computing.ai_core
    }

    /// AI cores not allocated to any virtual device
    pub fn core_num_unused(&self) -> u32 {
        self.free.computing.ai_core
    }

    /// AI cores allocated across all virtual devices
    pub fn used_core_count(&self) -> u32 {
        self.vdevices
            .iter()
            .fold(0u32, |acc, v| acc.saturating_add(v.computing.ai_core))
    }

    /// Look up a virtual device by ID
    pub fn find(&self, vdev_id: u32) -> Option<&VDevQueryInfo> {
        self.vdevices.iter().find(|v| v.vdev_id == vdev_id)
    }

    /// Check `total == free + used`
    pub fn is_consistent(&self) -> bool {
        self.core_count() == self.core_num_unused().saturating_add(self.used_core_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vdev(vdev_id: u32, ai_core: u32) -> VDevQueryInfo {
        VDevQueryInfo {
            vdev_id,
            status: VDevStatus::Created,
            vfid: vdev_id,
            container_id: 0,
            computing: ComputingResource { ai_core },
        }
    }

    #[test]
    fn test_consistency() {
        let mut info = VirtualDeviceInfo {
            total: SocTotalResource {
                computing: ComputingResource { ai_core: 8 },
                ..Default::default()
            },
            free: SocFreeResource {
                computing: ComputingResource { ai_core: 2 },
            },
            vdevices: vec![vdev(100, 4), vdev(101, 2)],
        };
        assert_eq!(info.used_core_count(), 6);
        assert!(info.is_consistent());

        info.total.computing.ai_core = 10;
        assert!(!info.is_consistent());
    }

    #[test]
    fn test_find() {
        let info = VirtualDeviceInfo {
            vdevices: vec![vdev(100, 4)],
            ..Default::default()
        };
        assert!(info.find(100).is_some());
        assert!(info.find(7).is_none());
    }

    #[test]
    fn test_status_decode() {
        assert_eq!(VDevStatus::from_code(0), VDevStatus::Created);
        assert_eq!(VDevStatus::from_code(1), VDevStatus::InUse);
        assert_eq!(VDevStatus::from_code(5), VDevStatus::Other(5));
        assert_eq!(VDevStatus::InUse.to_string(), "in-use");
    }

    #[test]
    fn test_container_used() {
        let mut v = vdev(1, 2);
        assert!(!v.is_container_used());
        v.container_id = 42;
        assert!(v.is_container_used());
    }
}
