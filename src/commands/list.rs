//! List command implementation
//!
//! Lists every device with its addressing and chip name.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, DeviceList, DeviceListEntry};
use crate::dcmi::DcmiDriver;
use crate::error::{NoValue, Result, ResultExt};
use crate::manager::DeviceManager;

/// Gather the device list
pub fn collect_device_list<D: DcmiDriver>(manager: &DeviceManager<D>) -> Result<DeviceList> {
    let card_count = manager.card_list()?.len();
    let logic_ids = manager.device_list()?;

    let devices = logic_ids
        .into_iter()
        .map(|logic_id| {
            let (card_id, device_id) = manager
                .card_id_device_id(logic_id)
                .unwrap_or((u32::no_value(), u32::no_value()));
            DeviceListEntry {
                logic_id,
                physic_id: manager.physic_id_from_logic_id(logic_id).or_no_value(),
                card_id,
                device_id,
                chip_name: manager
                    .chip_info(logic_id)
                    .map(|chip| chip.name)
                    .or_no_value(),
            }
        })
        .collect();

    Ok(DeviceList {
        device_type: manager.device_type().to_string(),
        card_count,
        devices,
    })
}

/// Execute the list command
pub fn run_list<D: DcmiDriver>(manager: &DeviceManager<D>, format: OutputFormat) -> Result<()> {
    let list = collect_device_list(manager)?;
    print_output(&list, format)?;
    Ok(())
}
