//! Virtual device resource translation
//!
//! Converts the driver's fixed-capacity parallel arrays into
//! [`VirtualDeviceInfo`]. The total AI core count is derived here and nowhere
//! else: it is the unused cores plus every slot's allocation.

use crate::dcmi::{RawVDevInfo, MAX_VDEV_NUM};
use crate::domain::{
    ComputingResource, SocFreeResource, SocTotalResource, VDevQueryInfo, VDevStatus,
    VirtualDeviceInfo,
};

/// Translate a raw report into the normalized resource model
pub fn translate(raw: &RawVDevInfo) -> VirtualDeviceInfo {
    let claimed = raw.vdev_num as usize;
    if claimed > MAX_VDEV_NUM {
        log::warn!(
            "Driver reported {} virtual devices, only {} slots exist; truncating",
            claimed,
            MAX_VDEV_NUM
        );
    }
    let count = claimed.min(MAX_VDEV_NUM);

    let vdevices: Vec<VDevQueryInfo> = (0..count)
        .map(|slot| VDevQueryInfo {
            vdev_id: raw.vdev_id[slot],
            status: VDevStatus::from_code(raw.status[slot]),
            vfid: raw.vf_id[slot],
            container_id: raw.cid[slot],
            computing: ComputingResource {
                ai_core: raw.core_num[slot],
            },
        })
        .collect();

    let used = vdevices
        .iter()
        .fold(0u32, |acc, v| acc.saturating_add(v.computing.ai_core));

    VirtualDeviceInfo {
        total: SocTotalResource {
            vdev_num: count as u32,
            vdev_ids: vdevices.iter().map(|v| v.vdev_id).collect(),
            computing: ComputingResource {
                ai_core: raw.core_num_unused.saturating_add(used),
            },
        },
        free: SocFreeResource {
            computing: ComputingResource {
                ai_core: raw.core_num_unused,
            },
        },
        vdevices,
    }
}
