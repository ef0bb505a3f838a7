//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::domain::DeviceType;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// DCMI-based NPU management tool
///
/// Inspect Ascend NPU devices and manage virtual NPUs.
#[derive(Parser, Debug)]
#[command(name = "npuctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "NPUCTL_CONFIG")]
    pub config: Option<String>,

    /// Expected device type; fails if the detected chip differs
    #[arg(long, global = true)]
    pub device_type: Option<DeviceType>,

    /// Path to libdcmi.so
    #[arg(long, global = true, env = "NPUCTL_LIBRARY")]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the installed chip
    Chip,

    /// List all devices
    List,

    /// Show device telemetry
    Info(InfoArgs),

    /// Manage virtual NPUs
    Vdev(VdevArgs),

    /// Check connectivity to a container runtime socket
    Endpoint {
        /// Endpoint URI (defaults to the configured endpoint)
        uri: Option<String>,
    },

    /// Validate a container-facing name as a DNS label
    CheckName {
        /// Name to validate
        name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Logical device ID (all devices when omitted)
    #[arg(short, long)]
    pub logic_id: Option<u32>,

    /// Show all information
    #[arg(short, long)]
    pub all: bool,

    /// Show health and error codes
    #[arg(long)]
    pub health: bool,

    /// Show power and voltage
    #[arg(long)]
    pub power: bool,

    /// Show temperature
    #[arg(long)]
    pub thermal: bool,

    /// Show memory and utilization
    #[arg(long)]
    pub memory: bool,

    /// Show HBM information
    #[arg(long)]
    pub hbm: bool,
}

impl InfoArgs {
    /// Whether no section flag was given
    pub fn none_selected(&self) -> bool {
        !(self.all || self.health || self.power || self.thermal || self.memory || self.hbm)
    }
}

/// Arguments for virtual NPU commands
#[derive(Parser, Debug)]
pub struct VdevArgs {
    #[command(subcommand)]
    pub command: VdevCommands,
}

/// Virtual NPU subcommands
#[derive(Subcommand, Debug)]
pub enum VdevCommands {
    /// Create a virtual NPU
    Create {
        /// Logical device ID
        logic_id: u32,
        /// AI cores to allocate
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        ai_core: u32,
    },

    /// Show resource split and virtual NPUs of a device
    Query {
        /// Logical device ID
        logic_id: u32,
    },

    /// Destroy a virtual NPU
    Destroy {
        /// Logical device ID
        logic_id: u32,
        /// Virtual device ID
        vdev_id: u32,
    },
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_list() {
        let args = Cli::try_parse_from(["npuctl", "list"]).unwrap();
        assert!(matches!(args.command, Commands::List));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["npuctl", "-v", "chip"]).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_parse_device_type() {
        let args = Cli::try_parse_from(["npuctl", "--device-type", "ascend310p", "list"]).unwrap();
        assert_eq!(args.device_type, Some(DeviceType::Ascend310P));

        let result = Cli::try_parse_from(["npuctl", "--device-type", "ascend710", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_info() {
        let args = Cli::try_parse_from(["npuctl", "info", "--logic-id", "2", "--hbm"]).unwrap();
        if let Commands::Info(info) = args.command {
            assert_eq!(info.logic_id, Some(2));
            assert!(info.hbm);
            assert!(!info.none_selected());
        } else {
            panic!("Expected Info command");
        }
    }

    #[test]
    fn test_cli_parse_vdev_create() {
        let args = Cli::try_parse_from(["npuctl", "vdev", "create", "0", "4"]).unwrap();
        if let Commands::Vdev(vdev) = args.command {
            if let VdevCommands::Create { logic_id, ai_core } = vdev.command {
                assert_eq!(logic_id, 0);
                assert_eq!(ai_core, 4);
            } else {
                panic!("Expected Create command");
            }
        } else {
            panic!("Expected Vdev command");
        }
    }

    #[test]
    fn test_cli_vdev_create_rejects_zero_cores() {
        let result = Cli::try_parse_from(["npuctl", "vdev", "create", "0", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_vdev_destroy() {
        let args = Cli::try_parse_from(["npuctl", "vdev", "destroy", "1", "101"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Vdev(VdevArgs {
                command: VdevCommands::Destroy {
                    logic_id: 1,
                    vdev_id: 101
                }
            })
        ));
    }

    #[test]
    fn test_cli_parse_endpoint_optional_uri() {
        let args = Cli::try_parse_from(["npuctl", "endpoint"]).unwrap();
        assert!(matches!(args.command, Commands::Endpoint { uri: None }));
    }
}
