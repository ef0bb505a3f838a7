//! Info command implementation
//!
//! Collects telemetry sections for one or all devices. A failed read shows
//! up as the type's "no value" sentinel rather than aborting the command.

use crate::cli::args::{InfoArgs, OutputFormat};
use crate::cli::output::{
    print_output, DeviceInfoList, DeviceInfoOutput, HbmSection, HealthSection, MemorySection,
    PowerSection,
};
use crate::dcmi::DcmiDriver;
use crate::domain::DeviceComponent;
use crate::error::{Result, ResultExt};
use crate::manager::DeviceManager;

/// Which sections to collect
#[derive(Debug, Clone, Copy, Default)]
pub struct Sections {
    pub health: bool,
    pub power: bool,
    pub thermal: bool,
    pub memory: bool,
    pub hbm: bool,
}

impl Sections {
    /// Everything the generation supports
    pub fn all(has_hbm: bool) -> Self {
        Self {
            health: true,
            power: true,
            thermal: true,
            memory: true,
            hbm: has_hbm,
        }
    }

    fn from_args(args: &InfoArgs, has_hbm: bool) -> Self {
        if args.all || args.none_selected() {
            return Self::all(has_hbm);
        }
        Self {
            health: args.health,
            power: args.power,
            thermal: args.thermal,
            memory: args.memory,
            hbm: args.hbm,
        }
    }
}

/// Gather the requested sections for one device
pub fn collect_device_info<D: DcmiDriver>(
    manager: &DeviceManager<D>,
    logic_id: u32,
    sections: Sections,
) -> DeviceInfoOutput {
    let chip_name = manager
        .chip_info(logic_id)
        .map(|chip| chip.name)
        .or_no_value();

    let health = sections.health.then(|| HealthSection {
        health: manager.health(logic_id).or_no_value(),
        network_health: manager.network_health(logic_id).or_no_value(),
        error_codes: manager.error_codes(logic_id).map(Some).or_no_value(),
    });

    let power = sections.power.then(|| PowerSection {
        power_watts: manager.power(logic_id).or_no_value(),
        voltage_volts: manager.voltage(logic_id).or_no_value(),
    });

    let temperature_celsius = sections
        .thermal
        .then(|| manager.temperature(logic_id).or_no_value());

    let memory = sections.memory.then(|| MemorySection {
        memory: manager.memory_info(logic_id).map(Some).or_no_value(),
        aicore_utilization: manager
            .utilization_rate(logic_id, DeviceComponent::AiCore)
            .or_no_value(),
        aicore_frequency_mhz: manager
            .frequency(logic_id, DeviceComponent::AiCoreCurrentFreq)
            .or_no_value(),
    });

    let hbm = sections.hbm.then(|| HbmSection {
        hbm: manager.hbm_info(logic_id).map(Some).or_no_value(),
        hbm_utilization: manager
            .utilization_rate(logic_id, DeviceComponent::Hbm)
            .or_no_value(),
    });

    DeviceInfoOutput {
        logic_id,
        chip_name,
        health,
        power,
        temperature_celsius,
        memory,
        hbm,
    }
}

/// Execute the info command
pub fn run_info<D: DcmiDriver>(
    manager: &DeviceManager<D>,
    args: &InfoArgs,
    format: OutputFormat,
) -> Result<()> {
    let sections = Sections::from_args(args, manager.has_hbm());

    let logic_ids = match args.logic_id {
        Some(id) => {
            // Reject an unknown ID up front instead of printing a row of N/A
            manager.card_id_device_id(id)?;
            vec![id]
        }
        None => manager.device_list()?,
    };

    let devices = logic_ids
        .into_iter()
        .map(|id| collect_device_info(manager, id, sections))
        .collect();

    print_output(&DeviceInfoList { devices }, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChipInfo;
    use crate::error::{AppError, DeviceError, NoValue};
    use crate::mock::{FakeDevice, FakeDriver};

    fn manager(chip_name: &str) -> DeviceManager<FakeDriver> {
        let driver = FakeDriver::new().with_card(
            0,
            vec![FakeDevice::new(0, ChipInfo::new("Ascend", chip_name, "V1"))],
        );
        DeviceManager::auto_init(driver, None).unwrap()
    }

    fn info_args() -> InfoArgs {
        InfoArgs {
            logic_id: None,
            all: false,
            health: false,
            power: false,
            thermal: false,
            memory: false,
            hbm: false,
        }
    }

    #[test]
    fn test_sections_default_to_all() {
        let sections = Sections::from_args(&info_args(), false);
        assert!(sections.health && sections.power && sections.thermal && sections.memory);
        assert!(!sections.hbm);

        let args = InfoArgs {
            thermal: true,
            ..info_args()
        };
        let sections = Sections::from_args(&args, true);
        assert!(sections.thermal);
        assert!(!sections.health);
        assert!(!sections.hbm);
    }

    #[test]
    fn test_collect_on_910() {
        let mgr = manager("910B");
        let info = collect_device_info(&mgr, 0, Sections::all(mgr.has_hbm()));

        assert_eq!(info.chip_name, "910B");
        assert_eq!(info.temperature_celsius, Some(45));
        let power = info.power.unwrap();
        assert!((power.power_watts - 72.5).abs() < 1e-4);
        assert!((power.voltage_volts - 0.85).abs() < 1e-4);
        let hbm = info.hbm.unwrap();
        assert!(hbm.hbm.is_some());
        assert_eq!(hbm.hbm_utilization, 30);
        assert_eq!(info.health.unwrap().network_health, 0);
    }

    #[test]
    fn test_unsupported_reads_become_sentinels() {
        let mgr = manager("310");
        let mut sections = Sections::all(false);
        sections.hbm = true;
        let info = collect_device_info(&mgr, 0, sections);

        assert!(info.power.unwrap().power_watts.is_no_value());
        assert!(info.health.unwrap().network_health.is_no_value());
        let hbm = info.hbm.unwrap();
        assert!(hbm.hbm.is_none());
        assert!(hbm.hbm_utilization.is_no_value());
    }

    #[test]
    fn test_run_info_unknown_logic_id() {
        let mgr = manager("310P3");
        let args = InfoArgs {
            logic_id: Some(9),
            ..info_args()
        };
        let err = run_info(&mgr, &args, OutputFormat::Json).unwrap_err();
        assert!(matches!(
            err,
            AppError::Device(DeviceError::AddressTranslationFailed { .. })
        ));
    }
}
