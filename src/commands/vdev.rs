//! Virtual NPU command implementation

use crate::cli::args::{OutputFormat, VdevArgs, VdevCommands};
use crate::cli::output::{print_output, Message, VdevQueryOutput};
use crate::dcmi::DcmiDriver;
use crate::error::Result;
use crate::manager::DeviceManager;

/// Execute a vdev subcommand
pub fn run_vdev<D: DcmiDriver>(
    manager: &DeviceManager<D>,
    args: &VdevArgs,
    format: OutputFormat,
) -> Result<()> {
    match args.command {
        VdevCommands::Create { logic_id, ai_core } => {
            let vdev_id = manager.create_vdevice(logic_id, ai_core)?;
            let msg = Message::ok(format!(
                "Created virtual device {} with {} AI cores on device {}",
                vdev_id, ai_core, logic_id
            ));
            print_output(&msg, format)?;
        }
        VdevCommands::Query { logic_id } => {
            let info = manager.virtual_device_info(logic_id)?;
            print_output(&VdevQueryOutput { logic_id, info }, format)?;
        }
        VdevCommands::Destroy { logic_id, vdev_id } => {
            let freed = manager
                .virtual_device_info(logic_id)?
                .find(vdev_id)
                .map(|v| v.computing.ai_core);
            manager.destroy_vdevice(logic_id, vdev_id)?;
            let msg = Message::ok(destroyed_message(logic_id, vdev_id, freed));
            print_output(&msg, format)?;
        }
    }
    Ok(())
}

fn destroyed_message(logic_id: u32, vdev_id: u32, freed: Option<u32>) -> String {
    match freed {
        Some(cores) => format!(
            "Destroyed virtual device {} on device {}, freed {} AI cores",
            vdev_id, logic_id, cores
        ),
        None => format!("Destroyed virtual device {} on device {}", vdev_id, logic_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChipInfo;
    use crate::error::{AppError, DcmiError, DeviceError};
    use crate::mock::{FakeDevice, FakeDriver};

    fn manager() -> (DeviceManager<FakeDriver>, FakeDriver) {
        let driver = FakeDriver::new().with_card(
            0,
            vec![FakeDevice::new(0, ChipInfo::new("Ascend", "310P3", "V1")).with_ai_core(8)],
        );
        let mgr = DeviceManager::auto_init(driver.clone(), None).unwrap();
        (mgr, driver)
    }

    fn run(mgr: &DeviceManager<FakeDriver>, command: VdevCommands) -> Result<()> {
        run_vdev(mgr, &VdevArgs { command }, OutputFormat::Json)
    }

    #[test]
    fn test_create_query_destroy() {
        let (mgr, driver) = manager();

        run(&mgr, VdevCommands::Create { logic_id: 0, ai_core: 4 }).unwrap();
        assert_eq!(driver.vdev_count(0, 0), 1);

        run(&mgr, VdevCommands::Query { logic_id: 0 }).unwrap();
        let info = mgr.virtual_device_info(0).unwrap();
        let vdev_id = info.total.vdev_ids[0];

        run(&mgr, VdevCommands::Destroy { logic_id: 0, vdev_id }).unwrap();
        assert_eq!(driver.vdev_count(0, 0), 0);
    }

    #[test]
    fn test_create_unsupported_size() {
        let (mgr, driver) = manager();
        let err = run(&mgr, VdevCommands::Create { logic_id: 0, ai_core: 3 }).unwrap_err();
        assert!(matches!(
            err,
            AppError::Device(DeviceError::DriverCallFailed {
                source: DcmiError::InvalidArgument(_),
                ..
            })
        ));
        assert_eq!(driver.calls("create_vdevice"), 0);
    }

    #[test]
    fn test_destroyed_message() {
        assert_eq!(
            destroyed_message(0, 7, Some(4)),
            "Destroyed virtual device 7 on device 0, freed 4 AI cores"
        );
        assert_eq!(
            destroyed_message(1, 9, None),
            "Destroyed virtual device 9 on device 1"
        );
    }

    #[test]
    fn test_destroy_unknown_vdev() {
        let (mgr, _) = manager();
        let result = run(&mgr, VdevCommands::Destroy { logic_id: 0, vdev_id: 42 });
        assert!(result.is_err());
    }
}
