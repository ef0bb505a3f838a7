//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::domain::DeviceType;
use crate::error::ConfigError;

use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from an explicit file, or the default locations
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override with CLI device type
    pub fn with_device_type(mut self, device_type: Option<DeviceType>) -> Self {
        if let Some(t) = device_type {
            self.config.device.expected_type = Some(t.as_str().to_string());
        }
        self
    }

    /// Override with CLI library path
    pub fn with_library(mut self, library: Option<PathBuf>) -> Self {
        if let Some(l) = library {
            self.config.device.library_path = Some(l);
        }
        self
    }

    /// Override with CLI endpoint
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(e) = endpoint {
            self.config.container.endpoint = e;
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build();
        assert!(!config.general.verbose);
        assert!(config.device.library_path.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_verbose(Some(true))
            .with_device_type(Some(DeviceType::Ascend310))
            .with_library(Some(PathBuf::from("/opt/dcmi/libdcmi.so")))
            .with_endpoint(Some("unix:///run/k3s/containerd.sock".to_string()))
            .build();

        assert!(config.general.verbose);
        assert_eq!(config.container.endpoint, "unix:///run/k3s/containerd.sock");
        assert_eq!(
            config.device.expected_device_type().unwrap(),
            Some(DeviceType::Ascend310)
        );
        assert_eq!(
            config.device.library_path,
            Some(PathBuf::from("/opt/dcmi/libdcmi.so"))
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ConfigBuilder::new().with_file(Some("/nonexistent/npuctl.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_cli_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nexpected_type = \"Ascend910\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ConfigBuilder::new()
            .with_file(Some(&path))
            .unwrap()
            .with_device_type(Some(DeviceType::Ascend310P))
            .build();
        assert_eq!(
            config.device.expected_device_type().unwrap(),
            Some(DeviceType::Ascend310P)
        );
    }
}
