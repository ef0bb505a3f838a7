//! Native DCMI structures, status codes and function signatures
//!
//! Layouts mirror `dcmi_interface_api.h`.

#![allow(non_camel_case_types)]

use super::traits::MAX_VDEV_NUM;
use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ulong, c_ulonglong};

/// Default library name searched by the dynamic loader
pub const DCMI_LIBRARY: &str = "libdcmi.so";

pub const DCMI_OK: c_int = 0;
pub const DCMI_ERR_CODE_INVALID_PARAMETER: c_int = -8001;
pub const DCMI_ERR_CODE_OPER_NOT_PERMITTED: c_int = -8002;
pub const DCMI_ERR_CODE_NOT_SUPPORT: c_int = -8255;

pub const MAX_CARD_NUM: usize = 64;
pub const MAX_ERROR_CODE_COUNT: usize = 128;
pub const MAX_CHIP_NAME_LEN: usize = 32;
pub const MAX_TEMPLATE_NAME_LEN: usize = 32;

pub const DCMI_ROCE_PORT: c_int = 1;
pub const DCMI_IPV4: c_int = 0;
pub const DCMI_IPV6: c_int = 1;

#[repr(C)]
pub struct dcmi_chip_info {
    pub chip_type: [c_uchar; MAX_CHIP_NAME_LEN],
    pub chip_name: [c_uchar; MAX_CHIP_NAME_LEN],
    pub chip_ver: [c_uchar; MAX_CHIP_NAME_LEN],
}

#[repr(C)]
pub struct dcmi_get_memory_info_stru {
    pub memory_size: c_ulonglong,
    pub memory_available: c_ulonglong,
    pub freq: c_uint,
    pub hugepagesize: c_ulong,
    pub hugepages_total: c_ulong,
    pub hugepages_free: c_ulong,
    pub utiliza: c_uint,
    pub reserve: [c_uchar; 60],
}

#[repr(C)]
pub struct dcmi_hbm_info {
    pub memory_size: c_ulonglong,
    pub freq: c_uint,
    pub memory_usage: c_ulonglong,
    pub temp: c_int,
    pub bandwith_util_rate: c_uint,
}

#[repr(C)]
pub struct dcmi_ip_addr {
    pub addr: [c_uchar; 16],
    pub ip_type: c_int,
}

#[repr(C)]
pub struct dcmi_create_vdev_res_stru {
    pub vdev_id: c_uint,
    pub vfg_id: c_uint,
    pub template_name: [c_char; MAX_TEMPLATE_NAME_LEN],
    pub reserved: [c_uchar; 64],
}

#[repr(C)]
pub struct dcmi_create_vdev_out {
    pub vdev_id: c_uint,
    pub pcie_bus: c_uint,
    pub pcie_device: c_uint,
    pub pcie_func: c_uint,
    pub vfg_id: c_uint,
    pub reserved: [c_uchar; 32],
}

#[repr(C)]
pub struct dcmi_vdev_info {
    pub vdev_num: c_uint,
    pub core_num_unused: c_uint,
    pub status: [c_uint; MAX_VDEV_NUM],
    pub vdev_id: [c_uint; MAX_VDEV_NUM],
    pub vf_id: [c_uint; MAX_VDEV_NUM],
    pub cid: [c_ulonglong; MAX_VDEV_NUM],
    pub core_num: [c_uint; MAX_VDEV_NUM],
}

pub type InitFn = unsafe extern "C" fn() -> c_int;
pub type GetCardNumListFn = unsafe extern "C" fn(*mut c_int, *mut c_int, c_int) -> c_int;
pub type GetDeviceNumInCardFn = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;
pub type GetChipInfoFn = unsafe extern "C" fn(c_int, c_int, *mut dcmi_chip_info) -> c_int;
pub type GetCardIdDeviceIdFn = unsafe extern "C" fn(*mut c_int, *mut c_int, c_uint) -> c_int;
pub type GetLogicIdFn = unsafe extern "C" fn(*mut c_int, c_int, c_int) -> c_int;
pub type MapIdFn = unsafe extern "C" fn(c_uint, *mut c_uint) -> c_int;
pub type GetUintFn = unsafe extern "C" fn(c_int, c_int, *mut c_uint) -> c_int;
pub type GetIntFn = unsafe extern "C" fn(c_int, c_int, *mut c_int) -> c_int;
pub type GetByTypeFn = unsafe extern "C" fn(c_int, c_int, c_int, *mut c_uint) -> c_int;
pub type GetMemoryInfoFn =
    unsafe extern "C" fn(c_int, c_int, *mut dcmi_get_memory_info_stru) -> c_int;
pub type GetHbmInfoFn = unsafe extern "C" fn(c_int, c_int, *mut dcmi_hbm_info) -> c_int;
pub type GetErrorCodeFn =
    unsafe extern "C" fn(c_int, c_int, *mut c_int, *mut c_uint, c_uint) -> c_int;
pub type GetDeviceIpFn = unsafe extern "C" fn(
    c_int,
    c_int,
    c_int,
    c_int,
    *mut dcmi_ip_addr,
    *mut dcmi_ip_addr,
) -> c_int;
pub type CreateVDeviceFn = unsafe extern "C" fn(
    c_int,
    c_int,
    *mut dcmi_create_vdev_res_stru,
    *mut dcmi_create_vdev_out,
) -> c_int;
pub type GetVDeviceInfoFn = unsafe extern "C" fn(c_int, c_int, *mut dcmi_vdev_info) -> c_int;
pub type DestroyVDeviceFn = unsafe extern "C" fn(c_int, c_int, c_uint) -> c_int;

/// Decode a NUL-terminated fixed-size C string field
pub fn field_to_string(buf: &[c_uchar]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_to_string() {
        let mut buf = [0u8; MAX_CHIP_NAME_LEN];
        buf[..4].copy_from_slice(b"910B");
        assert_eq!(field_to_string(&buf), "910B");

        let full = [b'a'; 4];
        assert_eq!(field_to_string(&full), "aaaa");

        assert_eq!(field_to_string(&[0u8; 8]), "");
    }
}
