//! Unified error types for npuctl
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use crate::domain::DeviceType;
use std::fmt;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the device abstraction layer
    #[error("{0}")]
    Device(#[from] DeviceError),

    /// Error from the DCMI driver boundary outside of a manager operation
    #[error("DCMI error: {0}")]
    Dcmi(#[from] DcmiError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the container runtime transport
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// IO error (file operations, output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by the DCMI driver boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DcmiError {
    /// The DCMI shared library could not be loaded
    #[error("DCMI library not found: {0}")]
    LibraryNotFound(String),

    /// A required symbol is missing from the loaded library
    #[error("DCMI symbol not available: {0}")]
    SymbolNotFound(String),

    /// The driver was used before init or after shutdown
    #[error("DCMI driver is not initialized")]
    NotInitialized,

    /// The device or generation does not implement this operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Invalid argument rejected by the backend or the driver
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The driver refused the call for lack of privileges
    #[error("Permission denied calling {0}. Try running as root.")]
    PermissionDenied(&'static str),

    /// Any other non-zero native status code
    #[error("{function} returned error code {code}")]
    Call { function: &'static str, code: i32 },
}

/// Why chip detection found nothing usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// The driver reported no cards at all
    NoHardware,
    /// Every probed device failed or returned malformed chip info
    NoValidChipInfo,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHardware => write!(f, "no NPU card found"),
            Self::NoValidChipInfo => write!(f, "cannot get valid chip info"),
        }
    }
}

/// Addressing context attached to a failed driver call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceContext {
    /// Host-level query (card list, device list)
    Host,
    /// Logical device ID
    Logic(u32),
    /// Physical device ID
    Physic(u32),
    /// Card and device slot
    Slot { card_id: u32, device_id: u32 },
}

impl fmt::Display for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Logic(id) => write!(f, "logicID({})", id),
            Self::Physic(id) => write!(f, "physicID({})", id),
            Self::Slot { card_id, device_id } => {
                write!(f, "cardID({}), deviceID({})", card_id, device_id)
            }
        }
    }
}

/// Errors from chip detection and the device manager
#[derive(Error, Debug)]
pub enum DeviceError {
    /// No hardware or no valid chip info
    #[error("Device not found: {0}")]
    NotFound(NotFoundKind),

    /// Configured device type disagrees with the detected chip
    #[error("The expected device type ({expected}) is inconsistent with the actual chip type ({detected})")]
    TypeMismatch {
        expected: DeviceType,
        detected: DeviceType,
    },

    /// The detected chip name does not belong to a supported generation
    #[error("Unsupported chip: {chip_name}")]
    Unsupported { chip_name: String },

    /// Mapping between logical, physical and slot addressing failed
    #[error("Failed to translate {context} to a device address: {source}")]
    AddressTranslationFailed {
        context: DeviceContext,
        #[source]
        source: DcmiError,
    },

    /// A backend call failed
    #[error("Failed to {operation} by {context}: {source}")]
    DriverCallFailed {
        operation: &'static str,
        context: DeviceContext,
        #[source]
        source: DcmiError,
    },

    /// Driver initialization failed
    #[error("Device manager init failed: {0}")]
    InitFailed(#[source] DcmiError),

    /// Driver shutdown failed
    #[error("Device manager shutdown failed: {0}")]
    ShutdownFailed(#[source] DcmiError),
}

impl DeviceError {
    /// Check whether this is an address translation failure
    pub fn is_address_translation(&self) -> bool {
        matches!(self, Self::AddressTranslationFailed { .. })
    }

    /// Get the underlying driver error, if any
    pub fn dcmi_source(&self) -> Option<&DcmiError> {
        match self {
            Self::AddressTranslationFailed { source, .. }
            | Self::DriverCallFailed { source, .. }
            | Self::InitFailed(source)
            | Self::ShutdownFailed(source) => Some(source),
            _ => None,
        }
    }
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors from the container runtime transport helper
#[derive(Error, Debug)]
pub enum TransportError {
    /// No endpoint configured
    #[error("endpoint is not set")]
    EndpointNotSet,

    /// Malformed endpoint URI
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    /// Scheme other than unix
    #[error("protocol {0:?} not supported, only unix socket endpoints are")]
    UnsupportedProtocol(String),

    /// Socket connection failed
    #[error("failed to connect: {0}")]
    Connect(#[from] std::io::Error),

    /// Name does not satisfy DNS label rules
    #[error("invalid DNS name: {0}")]
    InvalidDnsName(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// A documented "no value" for each result type
///
/// Callers that cannot carry a `Result` (table cells, exporter samples) use
/// this to tell a failed read apart from a genuine zero.
pub trait NoValue: Sized {
    /// The sentinel for this type
    fn no_value() -> Self;

    /// Check whether this value is the sentinel
    fn is_no_value(&self) -> bool;
}

impl NoValue for u32 {
    fn no_value() -> Self {
        u32::MAX
    }

    fn is_no_value(&self) -> bool {
        *self == u32::MAX
    }
}

impl NoValue for i32 {
    fn no_value() -> Self {
        -1
    }

    fn is_no_value(&self) -> bool {
        *self == -1
    }
}

impl NoValue for f32 {
    fn no_value() -> Self {
        -1.0
    }

    fn is_no_value(&self) -> bool {
        *self == -1.0
    }
}

impl NoValue for String {
    fn no_value() -> Self {
        String::new()
    }

    fn is_no_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> NoValue for Option<T> {
    fn no_value() -> Self {
        None
    }

    fn is_no_value(&self) -> bool {
        self.is_none()
    }
}

/// Collapse a device result into its sentinel on failure
pub trait ResultExt<T> {
    /// Return the value, or log the error and return `T::no_value()`
    fn or_no_value(self) -> T;
}

impl<T: NoValue> ResultExt<T> for std::result::Result<T, DeviceError> {
    fn or_no_value(self) -> T {
        self.unwrap_or_else(|e| {
            log::debug!("{}", e);
            T::no_value()
        })
    }
}
