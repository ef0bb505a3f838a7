//! Per-device telemetry types
//!
//! Component selectors for utilization/frequency queries, health codes and
//! error code lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device component selector used by utilization and frequency queries
///
/// Discriminants are the native DCMI input type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DeviceComponent {
    /// DDR memory
    Memory = 1,
    /// AI core
    AiCore = 2,
    /// AI CPU
    AiCpu = 3,
    /// Control CPU
    CtrlCpu = 4,
    /// DDR memory bandwidth
    MemoryBandwidth = 5,
    /// High-bandwidth memory
    Hbm = 6,
    /// AI core current frequency
    AiCoreCurrentFreq = 7,
    /// DDR
    Ddr = 8,
    /// AI core rated frequency
    AiCoreRatedFreq = 9,
    /// HBM bandwidth
    HbmBandwidth = 10,
    /// Vector core
    VectorCore = 12,
}

impl DeviceComponent {
    /// Native input type code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether this component only exists on HBM-equipped chips
    pub fn requires_hbm(self) -> bool {
        matches!(self, Self::Hbm | Self::HbmBandwidth)
    }
}

impl fmt::Display for DeviceComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "Memory",
            Self::AiCore => "AI Core",
            Self::AiCpu => "AI CPU",
            Self::CtrlCpu => "Ctrl CPU",
            Self::MemoryBandwidth => "Memory Bandwidth",
            Self::Hbm => "HBM",
            Self::AiCoreCurrentFreq => "AI Core Current Freq",
            Self::Ddr => "DDR",
            Self::AiCoreRatedFreq => "AI Core Rated Freq",
            Self::HbmBandwidth => "HBM Bandwidth",
            Self::VectorCore => "Vector Core",
        };
        f.write_str(name)
    }
}

/// Device health as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    /// No alarm
    Healthy,
    /// Minor alarm
    Minor,
    /// Major alarm
    Major,
    /// Critical alarm
    Critical,
    /// Code outside the documented range
    Unknown(u32),
}

impl HealthState {
    /// Decode a raw health code
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Healthy,
            1 => Self::Minor,
            2 => Self::Major,
            3 => Self::Critical,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Minor => write!(f, "Minor"),
            Self::Major => write!(f, "Major"),
            Self::Critical => write!(f, "Critical"),
            Self::Unknown(code) => write!(f, "Unknown({})", code),
        }
    }
}

/// Error codes currently raised by a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodes {
    /// Number of active errors reported by the driver
    pub count: u32,
    /// Error codes, at most `count` entries
    pub codes: Vec<u32>,
}

impl ErrorCodes {
    /// Build from a driver count and code buffer, trimming unused slots
    pub fn new(count: u32, mut codes: Vec<u32>) -> Self {
        codes.truncate(count as usize);
        Self { count, codes }
    }
}

impl fmt::Display for ErrorCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.codes.is_empty() {
            return write!(f, "none");
        }
        let codes: Vec<String> = self.codes.iter().map(|c| format!("{:#x}", c)).collect();
        write!(f, "{}", codes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_codes() {
        assert_eq!(DeviceComponent::Memory.code(), 1);
        assert_eq!(DeviceComponent::Hbm.code(), 6);
        assert_eq!(DeviceComponent::VectorCore.code(), 12);
        assert!(DeviceComponent::HbmBandwidth.requires_hbm());
        assert!(!DeviceComponent::AiCore.requires_hbm());
    }

    #[test]
    fn test_health_state() {
        assert_eq!(HealthState::from_code(0), HealthState::Healthy);
        assert_eq!(HealthState::from_code(3), HealthState::Critical);
        assert_eq!(HealthState::from_code(9), HealthState::Unknown(9));
    }

    #[test]
    fn test_error_codes() {
        let codes = ErrorCodes::new(2, vec![0x80e0_1801, 0x80e1_8402, 0, 0]);
        assert_eq!(codes.codes.len(), 2);
        assert_eq!(codes.to_string(), "0x80e01801, 0x80e18402");

        let none = ErrorCodes::default();
        assert_eq!(none.to_string(), "none");
    }
}
