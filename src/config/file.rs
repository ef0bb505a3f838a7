//! Configuration file loading
//!
//! Handles loading configuration from TOML files.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load and validate configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    ///
    /// A file that exists but fails to parse is an error rather than being
    /// skipped in favor of the next location.
    pub fn load_default() -> Result<Option<Config>, ConfigError> {
        Self::load_first(&Self::default_paths())
    }

    fn load_first(paths: &[PathBuf]) -> Result<Option<Config>, ConfigError> {
        for path in paths {
            if path.exists() {
                let config = Self::load(path)?;
                log::info!("Loaded config from {}", path.display());
                return Ok(Some(config));
            }
        }
        Ok(None)
    }

    /// Get default configuration file paths
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/npuctl/config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("npuctl").join("config.toml"));
        }

        paths.push(PathBuf::from("npuctl.toml"));
        paths.push(PathBuf::from(".npuctl.toml"));

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_paths_order() {
        let paths = ConfigFile::default_paths();
        assert_eq!(paths[0], PathBuf::from("/etc/npuctl/config.toml"));
        assert_eq!(paths.last(), Some(&PathBuf::from(".npuctl.toml")));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"
            [general]
            verbose = true

            [container]
            endpoint = "unix:///var/run/docker.sock"
            "#,
        );

        let config = ConfigFile::load(file.path()).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.container.endpoint, "unix:///var/run/docker.sock");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = write_config("[general\nverbose = ");
        assert!(matches!(
            ConfigFile::load(file.path()),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_load_invalid_device_type() {
        let file = write_config("[device]\nexpected_type = \"Ascend999\"\n");
        assert!(matches!(
            ConfigFile::load(file.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_first_skips_missing() {
        let file = write_config("[general]\nverbose = true\n");
        let paths = vec![
            PathBuf::from("/nonexistent/npuctl.toml"),
            file.path().to_path_buf(),
        ];
        let config = ConfigFile::load_first(&paths).unwrap().unwrap();
        assert!(config.general.verbose);

        assert!(ConfigFile::load_first(&paths[..1]).unwrap().is_none());
    }
}
