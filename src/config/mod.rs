//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::container::DEFAULT_ENDPOINT;
use crate::domain::DeviceType;
use crate::error::ConfigError;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Device selection and driver settings
    pub device: DeviceConfig,
    /// Container runtime settings
    pub container: ContainerConfig,
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.device.expected_device_type()?;
        if self.container.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "container.endpoint".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// General configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
}

/// Device configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Generation the host is expected to carry; detection must agree
    pub expected_type: Option<String>,
    /// Path to libdcmi.so, searched by the dynamic loader when unset
    pub library_path: Option<PathBuf>,
}

impl DeviceConfig {
    /// Parse `expected_type`
    pub fn expected_device_type(&self) -> Result<Option<DeviceType>, ConfigError> {
        self.expected_type
            .as_deref()
            .map(|s| {
                s.parse().map_err(|message| ConfigError::InvalidValue {
                    key: "device.expected_type".to_string(),
                    message,
                })
            })
            .transpose()
    }
}

/// Container runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Runtime endpoint URI
    pub endpoint: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.verbose);
        assert!(config.device.expected_type.is_none());
        assert_eq!(config.container.endpoint, DEFAULT_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expected_device_type() {
        let mut device = DeviceConfig {
            expected_type: Some("ascend310p".to_string()),
            ..Default::default()
        };
        assert_eq!(
            device.expected_device_type().unwrap(),
            Some(DeviceType::Ascend310P)
        );

        device.expected_type = Some("Ascend710".to_string());
        assert!(matches!(
            device.expected_device_type(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "device.expected_type"
        ));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [device]
            expected_type = "Ascend910"
            library_path = "/usr/local/dcmi/libdcmi.so"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.device.library_path,
            Some(PathBuf::from("/usr/local/dcmi/libdcmi.so"))
        );
        assert_eq!(config.container.endpoint, DEFAULT_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let mut config = Config::default();
        config.container.endpoint.clear();
        assert!(config.validate().is_err());
    }
}
