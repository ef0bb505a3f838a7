//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands. Telemetry
//! fields hold the type's no-value sentinel when a read failed; tables render
//! those as "N/A".

use crate::cli::args::OutputFormat;
use crate::domain::{ChipInfo, ErrorCodes, HbmInfo, HealthState, MemoryInfo, VirtualDeviceInfo};
use crate::error::NoValue;

use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};

const NOT_AVAILABLE: &str = "N/A";

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().trim_end().replace('\n', " | ")
    }
}

/// Render a value with a unit suffix, or "N/A" for the sentinel
fn or_na<T: NoValue + Display>(value: &T, unit: &str) -> String {
    if value.is_no_value() {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{}{}", value, unit)
    }
}

/// Like [`or_na`] with one decimal place
fn or_na_f32(value: f32, unit: &str) -> String {
    if value.is_no_value() {
        NOT_AVAILABLE.to_string()
    } else {
        format!("{:.1}{}", value, unit)
    }
}

/// Detected chip display
#[derive(Debug, Clone, Serialize)]
pub struct ChipOutput {
    pub chip_type: String,
    pub chip_name: String,
    pub chip_version: String,
    /// Classified generation, "unsupported" when none matches
    pub device_type: String,
}

impl From<&ChipInfo> for ChipOutput {
    fn from(chip: &ChipInfo) -> Self {
        Self {
            chip_type: chip.chip_type.clone(),
            chip_name: chip.name.clone(),
            chip_version: chip.version.clone(),
            device_type: chip
                .class()
                .device_type()
                .map_or_else(|| "unsupported".to_string(), |t| t.to_string()),
        }
    }
}

impl TableDisplay for ChipOutput {
    fn to_table(&self) -> String {
        format!(
            "Chip: {} {} ({})\nDevice Type: {}",
            self.chip_type, self.chip_name, self.chip_version, self.device_type
        )
    }

    fn to_compact(&self) -> String {
        format!("{}:{}", self.device_type, self.chip_name)
    }
}

/// Device list entry for display
#[derive(Debug, Clone, Serialize)]
pub struct DeviceListEntry {
    pub logic_id: u32,
    pub physic_id: u32,
    pub card_id: u32,
    pub device_id: u32,
    pub chip_name: String,
}

impl TableDisplay for DeviceListEntry {
    fn to_table(&self) -> String {
        format!(
            "[{}] {} (Physic ID: {}, Card: {}, Device: {})",
            self.logic_id,
            or_na(&self.chip_name, ""),
            or_na(&self.physic_id, ""),
            or_na(&self.card_id, ""),
            or_na(&self.device_id, "")
        )
    }

    fn to_compact(&self) -> String {
        format!("{}:{}", self.logic_id, or_na(&self.chip_name, ""))
    }
}

/// Device list for display
#[derive(Debug, Clone, Serialize)]
pub struct DeviceList {
    pub device_type: String,
    pub card_count: usize,
    pub devices: Vec<DeviceListEntry>,
}

impl TableDisplay for DeviceList {
    fn to_table(&self) -> String {
        let mut output = format!("Device Type: {}\n", self.device_type);
        output.push_str(&format!(
            "Cards: {}, Devices: {}\n\n",
            self.card_count,
            self.devices.len()
        ));

        for device in &self.devices {
            output.push_str(&device.to_table());
            output.push('\n');
        }

        output
    }

    fn to_compact(&self) -> String {
        self.devices
            .iter()
            .map(|d| d.to_compact())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Health section of device info
#[derive(Debug, Clone, Serialize)]
pub struct HealthSection {
    pub health: u32,
    pub network_health: u32,
    pub error_codes: Option<ErrorCodes>,
}

/// Power section of device info
#[derive(Debug, Clone, Serialize)]
pub struct PowerSection {
    pub power_watts: f32,
    pub voltage_volts: f32,
}

/// Memory section of device info
#[derive(Debug, Clone, Serialize)]
pub struct MemorySection {
    pub memory: Option<MemoryInfo>,
    pub aicore_utilization: u32,
    pub aicore_frequency_mhz: u32,
}

/// HBM section of device info
#[derive(Debug, Clone, Serialize)]
pub struct HbmSection {
    pub hbm: Option<HbmInfo>,
    pub hbm_utilization: u32,
}

/// Telemetry of one device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfoOutput {
    pub logic_id: u32,
    pub chip_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemorySection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hbm: Option<HbmSection>,
}

impl TableDisplay for DeviceInfoOutput {
    fn to_table(&self) -> String {
        let mut output = format!("[{}] {}\n", self.logic_id, or_na(&self.chip_name, ""));

        if let Some(h) = &self.health {
            let state = if h.health.is_no_value() {
                NOT_AVAILABLE.to_string()
            } else {
                HealthState::from_code(h.health).to_string()
            };
            output.push_str(&format!("  Health: {}\n", state));
            output.push_str(&format!(
                "  Network Health: {}\n",
                or_na(&h.network_health, "")
            ));
            match &h.error_codes {
                Some(codes) => output.push_str(&format!("  Error Codes: {}\n", codes)),
                None => output.push_str(&format!("  Error Codes: {}\n", NOT_AVAILABLE)),
            }
        }

        if let Some(p) = &self.power {
            output.push_str(&format!("  Power: {}\n", or_na_f32(p.power_watts, "W")));
            output.push_str(&format!("  Voltage: {}\n", or_na_f32(p.voltage_volts, "V")));
        }

        if let Some(t) = &self.temperature_celsius {
            output.push_str(&format!("  Temperature: {}\n", or_na(t, "°C")));
        }

        if let Some(m) = &self.memory {
            match &m.memory {
                Some(mem) => output.push_str(&format!("  Memory: {}\n", mem)),
                None => output.push_str(&format!("  Memory: {}\n", NOT_AVAILABLE)),
            }
            output.push_str(&format!(
                "  AI Core Utilization: {}\n",
                or_na(&m.aicore_utilization, "%")
            ));
            output.push_str(&format!(
                "  AI Core Frequency: {}\n",
                or_na(&m.aicore_frequency_mhz, " MHz")
            ));
        }

        if let Some(h) = &self.hbm {
            match &h.hbm {
                Some(hbm) => output.push_str(&format!("  HBM: {}\n", hbm)),
                None => output.push_str(&format!("  HBM: {}\n", NOT_AVAILABLE)),
            }
            output.push_str(&format!(
                "  HBM Utilization: {}\n",
                or_na(&h.hbm_utilization, "%")
            ));
        }

        output
    }
}

/// Telemetry of several devices
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfoList {
    pub devices: Vec<DeviceInfoOutput>,
}

impl TableDisplay for DeviceInfoList {
    fn to_table(&self) -> String {
        self.devices
            .iter()
            .map(|d| d.to_table())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_compact(&self) -> String {
        self.devices
            .iter()
            .map(|d| d.to_compact())
            .collect::<Vec<_>>()
            .join(" || ")
    }
}

/// Virtual NPU resource split of one device
#[derive(Debug, Clone, Serialize)]
pub struct VdevQueryOutput {
    pub logic_id: u32,
    #[serde(flatten)]
    pub info: VirtualDeviceInfo,
}

impl TableDisplay for VdevQueryOutput {
    fn to_table(&self) -> String {
        let mut output = format!("[{}] Virtual NPUs: {}\n", self.logic_id, self.info.vdevices.len());
        output.push_str(&format!(
            "  AI Cores: {} total, {} free, {} allocated\n",
            self.info.core_count(),
            self.info.core_num_unused(),
            self.info.used_core_count()
        ));

        if self.info.vdevices.is_empty() {
            return output;
        }

        output.push_str("\n  VDEV     VF     Cores   Status     Container\n");
        output.push_str("  ──────────────────────────────────────────────\n");
        for vdev in &self.info.vdevices {
            let container = match (vdev.is_container_used(), vdev.container_id) {
                (false, _) => "-".to_string(),
                (true, 0) => "bound".to_string(),
                (true, id) => format!("{:#x}", id),
            };
            output.push_str(&format!(
                "  {:<8} {:<6} {:<7} {:<10} {}\n",
                vdev.vdev_id,
                vdev.vfid,
                vdev.computing.ai_core,
                vdev.status.to_string(),
                container
            ));
        }

        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{}: {} vdevs, {}/{} AI cores free",
            self.logic_id,
            self.info.vdevices.len(),
            self.info.core_num_unused(),
            self.info.core_count()
        )
    }
}

/// Confirmation of a completed action
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl Message {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        format!("✓ {}", self.message)
    }
}
