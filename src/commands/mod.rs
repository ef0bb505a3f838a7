//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command. Device
//! commands take an already initialized [`DeviceManager`] so they run the
//! same against the real library and the fake driver.

pub mod chip;
pub mod endpoint;
pub mod info;
pub mod list;
pub mod vdev;

pub use chip::run_chip;
pub use endpoint::{run_check_name, run_endpoint};
pub use info::run_info;
pub use list::run_list;
pub use vdev::run_vdev;

use crate::config::Config;
use crate::dcmi::DcmiLibrary;
use crate::error::Result;
use crate::manager::DeviceManager;

/// Driver handle for the configured library location
pub fn driver_from_config(config: &Config) -> DcmiLibrary {
    match &config.device.library_path {
        Some(path) => DcmiLibrary::with_path(path),
        None => DcmiLibrary::new(),
    }
}

/// Detect the chip and open a device manager as configured
pub fn open_manager(config: &Config) -> Result<DeviceManager<DcmiLibrary>> {
    let expected = config.device.expected_device_type()?;
    let manager = DeviceManager::auto_init(driver_from_config(config), expected)?;
    Ok(manager)
}
