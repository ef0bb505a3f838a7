//! Memory and HBM telemetry snapshots
//!
//! Each value is a fresh point-in-time reading from the driver. Nothing here
//! is cached or diffed against earlier readings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device DDR memory snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total memory in MB
    #[serde(rename = "memory_size")]
    pub size_mb: u64,
    /// Available memory in MB
    #[serde(rename = "memory_available")]
    pub available_mb: u64,
    /// Memory frequency in MHz
    #[serde(rename = "memory_frequency")]
    pub frequency_mhz: u32,
    /// Memory utilization percentage
    #[serde(rename = "memory_utilization")]
    pub utilization: u32,
}

impl MemoryInfo {
    /// Create a new memory snapshot
    pub fn new(size_mb: u64, available_mb: u64, frequency_mhz: u32, utilization: u32) -> Self {
        Self {
            size_mb,
            available_mb,
            frequency_mhz,
            utilization,
        }
    }

    /// Memory in use, in MB
    pub fn used_mb(&self) -> u64 {
        self.size_mb.saturating_sub(self.available_mb)
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} MB @ {} MHz ({}%)",
            self.used_mb(),
            self.size_mb,
            self.frequency_mhz,
            self.utilization
        )
    }
}

/// High-bandwidth memory snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HbmInfo {
    /// HBM total size in KB
    #[serde(rename = "memory_size")]
    pub size_kb: u64,
    /// HBM frequency in MHz
    #[serde(rename = "hbm_frequency")]
    pub frequency_mhz: u32,
    /// HBM usage in KB
    #[serde(rename = "memory_usage")]
    pub usage_kb: u64,
    /// HBM temperature in Celsius
    #[serde(rename = "hbm_temperature")]
    pub temperature: i32,
    /// HBM bandwidth utilization percentage
    #[serde(rename = "hbm_bandwidth_util")]
    pub bandwidth_util_rate: u32,
}

impl HbmInfo {
    /// Fraction of HBM in use, 0.0 when the size is unknown
    pub fn usage_ratio(&self) -> f64 {
        if self.size_kb == 0 {
            return 0.0;
        }
        self.usage_kb as f64 / self.size_kb as f64
    }
}

impl fmt::Display for HbmInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} MB ({:.0}%) @ {} MHz, {}°C, bandwidth {}%",
            self.usage_kb / 1024,
            self.size_kb / 1024,
            self.usage_ratio() * 100.0,
            self.frequency_mhz,
            self.temperature,
            self.bandwidth_util_rate
        )
    }
}
