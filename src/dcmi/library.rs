//! DCMI library implementation
//!
//! Real implementation of DcmiDriver, loading the vendor library at runtime.

use crate::dcmi::ffi::{self, *};
use crate::dcmi::traits::{DcmiDriver, RawVDevInfo};
use crate::domain::{ChipInfo, DeviceComponent, ErrorCodes, HbmInfo, MemoryInfo};
use crate::error::DcmiError;

use libloading::{Library, Symbol};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::os::raw::{c_char, c_int, c_uint};
use std::path::PathBuf;

/// Handle to the dynamically loaded DCMI library
///
/// The library is opened by `init` and closed by `shutdown`. Calls made
/// outside that window fail with [`DcmiError::NotInitialized`].
pub struct DcmiLibrary {
    path: PathBuf,
    lib: Option<Library>,
}

impl DcmiLibrary {
    /// Create a handle for the default library name
    pub fn new() -> Self {
        Self::with_path(ffi::DCMI_LIBRARY)
    }

    /// Create a handle for a specific library path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lib: None,
        }
    }

    /// Path the library is loaded from
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn symbol<T>(&self, name: &'static str) -> Result<Symbol<'_, T>, DcmiError> {
        let lib = self.lib.as_ref().ok_or(DcmiError::NotInitialized)?;
        // SAFETY: T is the documented signature of `name` in dcmi_interface_api.h
        unsafe { lib.get(name.as_bytes()) }
            .map_err(|e| DcmiError::SymbolNotFound(format!("{}: {}", name, e)))
    }

    /// Convert a native status code
    fn check(function: &'static str, ret: c_int) -> Result<(), DcmiError> {
        match ret {
            DCMI_OK => Ok(()),
            DCMI_ERR_CODE_INVALID_PARAMETER => Err(DcmiError::InvalidArgument(format!(
                "{} rejected its arguments",
                function
            ))),
            DCMI_ERR_CODE_OPER_NOT_PERMITTED => Err(DcmiError::PermissionDenied(function)),
            DCMI_ERR_CODE_NOT_SUPPORT => Err(DcmiError::NotSupported(function.to_string())),
            code => Err(DcmiError::Call { function, code }),
        }
    }

    fn get_uint(&self, name: &'static str, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        let func: Symbol<GetUintFn> = self.symbol(name)?;
        let mut value: c_uint = 0;
        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut value) };
        Self::check(name, ret)?;
        Ok(value)
    }

    fn get_by_type(
        &self,
        name: &'static str,
        card_id: u32,
        device_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DcmiError> {
        let func: Symbol<GetByTypeFn> = self.symbol(name)?;
        let mut value: c_uint = 0;
        let ret = unsafe {
            func(
                card_id as c_int,
                device_id as c_int,
                component.code(),
                &mut value,
            )
        };
        Self::check(name, ret)?;
        Ok(value)
    }

    fn map_id(&self, name: &'static str, id: u32) -> Result<u32, DcmiError> {
        let func: Symbol<MapIdFn> = self.symbol(name)?;
        let mut mapped: c_uint = 0;
        let ret = unsafe { func(id, &mut mapped) };
        Self::check(name, ret)?;
        Ok(mapped)
    }
}

impl Default for DcmiLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn non_negative(function: &'static str, value: c_int) -> Result<u32, DcmiError> {
    u32::try_from(value).map_err(|_| DcmiError::Call {
        function,
        code: value,
    })
}

impl DcmiDriver for DcmiLibrary {
    fn init(&mut self) -> Result<(), DcmiError> {
        // SAFETY: loading the vendor library runs its initializers
        let lib = unsafe { Library::new(&self.path) }
            .map_err(|e| DcmiError::LibraryNotFound(format!("{}: {}", self.path.display(), e)))?;
        self.lib = Some(lib);

        let result = self
            .symbol::<InitFn>("dcmi_init")
            .map(|func| unsafe { func() })
            .and_then(|ret| Self::check("dcmi_init", ret));
        if let Err(e) = result {
            self.lib = None;
            return Err(e);
        }

        log::debug!("Loaded DCMI from {}", self.path.display());
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DcmiError> {
        match self.lib.take() {
            Some(lib) => lib
                .close()
                .map_err(|e| DcmiError::LibraryNotFound(format!("close failed: {}", e))),
            None => Err(DcmiError::NotInitialized),
        }
    }

    fn card_list(&self) -> Result<Vec<u32>, DcmiError> {
        const NAME: &str = "dcmi_get_card_num_list";
        let func: Symbol<GetCardNumListFn> = self.symbol(NAME)?;
        let mut card_num: c_int = 0;
        let mut cards = [0 as c_int; MAX_CARD_NUM];
        let ret = unsafe { func(&mut card_num, cards.as_mut_ptr(), MAX_CARD_NUM as c_int) };
        Self::check(NAME, ret)?;

        let count = non_negative(NAME, card_num)?.min(MAX_CARD_NUM as u32) as usize;
        cards[..count]
            .iter()
            .map(|&id| non_negative(NAME, id))
            .collect()
    }

    fn device_num_in_card(&self, card_id: u32) -> Result<u32, DcmiError> {
        const NAME: &str = "dcmi_get_device_num_in_card";
        let func: Symbol<GetDeviceNumInCardFn> = self.symbol(NAME)?;
        let mut num: c_int = 0;
        let ret = unsafe { func(card_id as c_int, &mut num) };
        Self::check(NAME, ret)?;
        non_negative(NAME, num)
    }

    fn chip_info(&self, card_id: u32, device_id: u32) -> Result<ChipInfo, DcmiError> {
        const NAME: &str = "dcmi_get_device_chip_info";
        let func: Symbol<GetChipInfoFn> = self.symbol(NAME)?;
        // SAFETY: plain byte arrays, all-zero is a valid value
        let mut info: dcmi_chip_info = unsafe { std::mem::zeroed() };
        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut info) };
        Self::check(NAME, ret)?;

        Ok(ChipInfo::new(
            field_to_string(&info.chip_type),
            field_to_string(&info.chip_name),
            field_to_string(&info.chip_ver),
        ))
    }

    fn card_id_device_id(&self, logic_id: u32) -> Result<(u32, u32), DcmiError> {
        const NAME: &str = "dcmi_get_card_id_device_id_from_logicid";
        let func: Symbol<GetCardIdDeviceIdFn> = self.symbol(NAME)?;
        let mut card_id: c_int = 0;
        let mut device_id: c_int = 0;
        let ret = unsafe { func(&mut card_id, &mut device_id, logic_id) };
        Self::check(NAME, ret)?;
        Ok((non_negative(NAME, card_id)?, non_negative(NAME, device_id)?))
    }

    fn logic_id(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        const NAME: &str = "dcmi_get_device_logic_id";
        let func: Symbol<GetLogicIdFn> = self.symbol(NAME)?;
        let mut logic_id: c_int = 0;
        let ret = unsafe { func(&mut logic_id, card_id as c_int, device_id as c_int) };
        Self::check(NAME, ret)?;
        non_negative(NAME, logic_id)
    }

    fn physic_id_from_logic_id(&self, logic_id: u32) -> Result<u32, DcmiError> {
        self.map_id("dcmi_get_device_phyid_from_logicid", logic_id)
    }

    fn logic_id_from_physic_id(&self, physic_id: u32) -> Result<u32, DcmiError> {
        self.map_id("dcmi_get_device_logicid_from_phyid", physic_id)
    }

    fn health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.get_uint("dcmi_get_device_health", card_id, device_id)
    }

    fn network_health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.get_uint("dcmi_get_device_network_health", card_id, device_id)
    }

    fn utilization_rate(
        &self,
        card_id: u32,
        device_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DcmiError> {
        self.get_by_type(
            "dcmi_get_device_utilization_rate",
            card_id,
            device_id,
            component,
        )
    }

    fn temperature(&self, card_id: u32, device_id: u32) -> Result<i32, DcmiError> {
        const NAME: &str = "dcmi_get_device_temperature";
        let func: Symbol<GetIntFn> = self.symbol(NAME)?;
        let mut temp: c_int = 0;
        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut temp) };
        Self::check(NAME, ret)?;
        Ok(temp)
    }

    fn voltage(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.get_uint("dcmi_get_device_voltage", card_id, device_id)
    }

    fn power(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        const NAME: &str = "dcmi_get_device_power_info";
        let func: Symbol<GetIntFn> = self.symbol(NAME)?;
        let mut power: c_int = 0;
        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut power) };
        Self::check(NAME, ret)?;
        non_negative(NAME, power)
    }

    fn frequency(
        &self,
        card_id: u32,
        device_id: u32,
        component: DeviceComponent,
    ) -> Result<u32, DcmiError> {
        self.get_by_type("dcmi_get_device_frequency", card_id, device_id, component)
    }

    fn memory_info(&self, card_id: u32, device_id: u32) -> Result<MemoryInfo, DcmiError> {
        const NAME: &str = "dcmi_get_device_memory_info_v3";
        let func: Symbol<GetMemoryInfoFn> = self.symbol(NAME)?;
        // SAFETY: integers and byte arrays, all-zero is a valid value
        let mut info: dcmi_get_memory_info_stru = unsafe { std::mem::zeroed() };
        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut info) };
        Self::check(NAME, ret)?;

        Ok(MemoryInfo::new(
            info.memory_size,
            info.memory_available,
            info.freq,
            info.utiliza,
        ))
    }

    fn hbm_info(&self, card_id: u32, device_id: u32) -> Result<HbmInfo, DcmiError> {
        const NAME: &str = "dcmi_get_device_hbm_info";
        let func: Symbol<GetHbmInfoFn> = self.symbol(NAME)?;
        // SAFETY: integers only, all-zero is a valid value
        let mut info: dcmi_hbm_info = unsafe { std::mem::zeroed() };
        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut info) };
        Self::check(NAME, ret)?;

        Ok(HbmInfo {
            size_kb: info.memory_size,
            frequency_mhz: info.freq,
            usage_kb: info.memory_usage,
            temperature: info.temp,
            bandwidth_util_rate: info.bandwith_util_rate,
        })
    }

    fn error_codes(&self, card_id: u32, device_id: u32) -> Result<ErrorCodes, DcmiError> {
        const NAME: &str = "dcmi_get_device_errorcode_v2";
        let func: Symbol<GetErrorCodeFn> = self.symbol(NAME)?;
        let mut count: c_int = 0;
        let mut codes = vec![0 as c_uint; MAX_ERROR_CODE_COUNT];
        let ret = unsafe {
            func(
                card_id as c_int,
                device_id as c_int,
                &mut count,
                codes.as_mut_ptr(),
                MAX_ERROR_CODE_COUNT as c_uint,
            )
        };
        Self::check(NAME, ret)?;

        let count = non_negative(NAME, count)?;
        codes.truncate((count as usize).min(MAX_ERROR_CODE_COUNT));
        Ok(ErrorCodes::new(count, codes))
    }

    fn ip_address(&self, card_id: u32, device_id: u32) -> Result<IpAddr, DcmiError> {
        const NAME: &str = "dcmi_get_device_ip";
        let func: Symbol<GetDeviceIpFn> = self.symbol(NAME)?;
        // SAFETY: byte array and int, all-zero is a valid value
        let mut ip: dcmi_ip_addr = unsafe { std::mem::zeroed() };
        let mut mask: dcmi_ip_addr = unsafe { std::mem::zeroed() };
        let ret = unsafe {
            func(
                card_id as c_int,
                device_id as c_int,
                DCMI_ROCE_PORT,
                0,
                &mut ip,
                &mut mask,
            )
        };
        Self::check(NAME, ret)?;

        match ip.ip_type {
            DCMI_IPV4 => {
                let [a, b, c, d, ..] = ip.addr;
                Ok(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
            }
            DCMI_IPV6 => Ok(IpAddr::V6(Ipv6Addr::from(ip.addr))),
            other => Err(DcmiError::InvalidArgument(format!(
                "{} returned unknown address type {}",
                NAME, other
            ))),
        }
    }

    fn create_vdevice(
        &self,
        card_id: u32,
        device_id: u32,
        template: &str,
    ) -> Result<u32, DcmiError> {
        const NAME: &str = "dcmi_create_vdevice";
        if template.len() >= MAX_TEMPLATE_NAME_LEN {
            return Err(DcmiError::InvalidArgument(format!(
                "template name '{}' too long",
                template
            )));
        }

        let func: Symbol<CreateVDeviceFn> = self.symbol(NAME)?;
        // SAFETY: integers and byte arrays, all-zero is a valid value
        let mut res: dcmi_create_vdev_res_stru = unsafe { std::mem::zeroed() };
        let mut out: dcmi_create_vdev_out = unsafe { std::mem::zeroed() };
        for (dst, &src) in res.template_name.iter_mut().zip(template.as_bytes()) {
            *dst = src as c_char;
        }

        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut res, &mut out) };
        Self::check(NAME, ret)?;
        Ok(out.vdev_id)
    }

    fn vdevice_info(&self, card_id: u32, device_id: u32) -> Result<RawVDevInfo, DcmiError> {
        const NAME: &str = "dcmi_get_vdevice_info";
        let func: Symbol<GetVDeviceInfoFn> = self.symbol(NAME)?;
        // SAFETY: integer arrays, all-zero is a valid value
        let mut info: dcmi_vdev_info = unsafe { std::mem::zeroed() };
        let ret = unsafe { func(card_id as c_int, device_id as c_int, &mut info) };
        Self::check(NAME, ret)?;

        Ok(RawVDevInfo {
            vdev_num: info.vdev_num,
            core_num_unused: info.core_num_unused,
            status: info.status,
            vdev_id: info.vdev_id,
            vf_id: info.vf_id,
            cid: info.cid,
            core_num: info.core_num,
        })
    }

    fn destroy_vdevice(&self, card_id: u32, device_id: u32, vdev_id: u32) -> Result<(), DcmiError> {
        const NAME: &str = "dcmi_set_destroy_vdevice";
        let func: Symbol<DestroyVDeviceFn> = self.symbol(NAME)?;
        let ret = unsafe { func(card_id as c_int, device_id as c_int, vdev_id) };
        Self::check(NAME, ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calls_before_init_fail() {
        let lib = DcmiLibrary::new();
        assert_eq!(lib.card_list(), Err(DcmiError::NotInitialized));
        assert_eq!(lib.temperature(0, 0), Err(DcmiError::NotInitialized));
    }

    #[test]
    fn test_shutdown_without_init() {
        let mut lib = DcmiLibrary::with_path("/nonexistent/libdcmi.so");
        assert_eq!(lib.shutdown(), Err(DcmiError::NotInitialized));
    }

    #[test]
    fn test_init_missing_library() {
        let mut lib = DcmiLibrary::with_path("/nonexistent/libdcmi.so");
        assert!(matches!(lib.init(), Err(DcmiError::LibraryNotFound(_))));
    }

    #[test]
    fn test_status_mapping() {
        assert!(DcmiLibrary::check("f", DCMI_OK).is_ok());
        assert!(matches!(
            DcmiLibrary::check("f", DCMI_ERR_CODE_NOT_SUPPORT),
            Err(DcmiError::NotSupported(_))
        ));
        assert_eq!(
            DcmiLibrary::check("f", DCMI_ERR_CODE_OPER_NOT_PERMITTED),
            Err(DcmiError::PermissionDenied("f"))
        );
        assert_eq!(
            DcmiLibrary::check("f", -9000),
            Err(DcmiError::Call {
                function: "f",
                code: -9000
            })
        );
    }

    #[test]
    #[ignore = "Requires an Ascend NPU and driver"]
    fn test_library_init() {
        let mut lib = DcmiLibrary::new();
        assert!(lib.init().is_ok());
        assert!(!lib.card_list().unwrap().is_empty());
        assert!(lib.shutdown().is_ok());
    }
}
