//! Chip identification and generation classification
//!
//! Provides ChipInfo as reported by the driver and the mapping from chip
//! names to the supported accelerator generations.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Maximum byte length of each chip info field in the native struct
pub const MAX_CHIP_NAME_LEN: usize = 32;

/// Chip identity reported by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInfo {
    /// Chip type (e.g. "Ascend")
    #[serde(rename = "chip_type")]
    pub chip_type: String,
    /// Chip name (e.g. "910B")
    #[serde(rename = "chip_name")]
    pub name: String,
    /// Chip version (e.g. "V1")
    #[serde(rename = "chip_version")]
    pub version: String,
}

impl ChipInfo {
    /// Create new chip info
    pub fn new(
        chip_type: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            chip_type: chip_type.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Check that the driver returned a well-formed record
    ///
    /// Disabled or absent slots often answer with empty or garbage fields.
    pub fn is_valid(&self) -> bool {
        let field_ok = |s: &str| !s.trim().is_empty() && s.len() <= MAX_CHIP_NAME_LEN;
        field_ok(&self.chip_type)
            && field_ok(&self.name)
            && self.version.len() <= MAX_CHIP_NAME_LEN
            && version_pattern().is_match(&self.version)
    }

    /// Classify this chip into a generation
    pub fn class(&self) -> ChipClass {
        ChipClass::classify(&self.name)
    }
}

impl fmt::Display for ChipInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.chip_type, self.name, self.version)
    }
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[Vv]?\d+(\.\d+)*[A-Za-z]?$").expect("static version pattern is valid")
    })
}

/// Supported accelerator generations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Training generation with HBM and RoCE networking
    Ascend910,
    /// Inference generation with vNPU support
    Ascend310P,
    /// Legacy inference generation
    Ascend310,
}

impl DeviceType {
    /// All supported generations
    pub const ALL: [DeviceType; 3] = [Self::Ascend910, Self::Ascend310P, Self::Ascend310];

    /// Canonical name of this generation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascend910 => "Ascend910",
            Self::Ascend310P => "Ascend310P",
            Self::Ascend310 => "Ascend310",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown device type '{}' (expected one of Ascend910, Ascend310P, Ascend310)",
                    s
                )
            })
    }
}

/// Name prefixes checked in order after lowercasing and dropping "ascend".
/// Longer prefixes come first so "310p" is not swallowed by "310".
const CHIP_NAME_PREFIXES: &[(&str, DeviceType)] = &[
    ("310p", DeviceType::Ascend310P),
    ("310", DeviceType::Ascend310),
    ("910", DeviceType::Ascend910),
];

/// Result of classifying a chip name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipClass {
    /// Name maps to a supported generation
    Supported(DeviceType),
    /// Name matches no known generation
    Unsupported,
}

impl ChipClass {
    /// Classify a chip name. Every input maps to exactly one outcome.
    pub fn classify(chip_name: &str) -> Self {
        let lower = chip_name.trim().to_ascii_lowercase();
        let stem = lower.strip_prefix("ascend").unwrap_or(&lower);

        CHIP_NAME_PREFIXES
            .iter()
            .find(|(prefix, _)| stem.starts_with(prefix))
            .map(|&(_, device_type)| Self::Supported(device_type))
            .unwrap_or(Self::Unsupported)
    }

    /// Get the device type if supported
    pub fn device_type(&self) -> Option<DeviceType> {
        match self {
            Self::Supported(t) => Some(*t),
            Self::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_names() {
        assert_eq!(
            ChipClass::classify("ascend910"),
            ChipClass::Supported(DeviceType::Ascend910)
        );
        assert_eq!(
            ChipClass::classify("910B"),
            ChipClass::Supported(DeviceType::Ascend910)
        );
        assert_eq!(
            ChipClass::classify("310P3"),
            ChipClass::Supported(DeviceType::Ascend310P)
        );
        assert_eq!(
            ChipClass::classify("Ascend310"),
            ChipClass::Supported(DeviceType::Ascend310)
        );
    }

    #[test]
    fn test_classify_unknown_names() {
        assert_eq!(ChipClass::classify(""), ChipClass::Unsupported);
        assert_eq!(ChipClass::classify("710"), ChipClass::Unsupported);
        assert_eq!(ChipClass::classify("ascend"), ChipClass::Unsupported);
        assert_eq!(ChipClass::classify("x910"), ChipClass::Unsupported);
    }

    #[test]
    fn test_chip_info_validity() {
        assert!(ChipInfo::new("NPU", "ascend910", "1.0").is_valid());
        assert!(ChipInfo::new("Ascend", "910B", "V1").is_valid());
        assert!(!ChipInfo::new("", "910B", "V1").is_valid());
        assert!(!ChipInfo::new("Ascend", "  ", "V1").is_valid());
        assert!(!ChipInfo::new("Ascend", "910B", "").is_valid());
        assert!(!ChipInfo::new("Ascend", "910B", "\u{1}\u{2}").is_valid());

        let long = "x".repeat(MAX_CHIP_NAME_LEN + 1);
        assert!(!ChipInfo::new("Ascend", long, "V1").is_valid());
    }

    #[test]
    fn test_device_type_from_str() {
        assert_eq!(
            "ascend310p".parse::<DeviceType>().unwrap(),
            DeviceType::Ascend310P
        );
        assert_eq!(
            "Ascend910".parse::<DeviceType>().unwrap(),
            DeviceType::Ascend910
        );
        assert!("Ascend710".parse::<DeviceType>().is_err());
    }

    #[test]
    fn test_chip_info_display() {
        let info = ChipInfo::new("Ascend", "910B", "V1");
        assert_eq!(info.to_string(), "Ascend 910B (V1)");
    }
}
