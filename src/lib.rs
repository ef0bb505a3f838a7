//! npuctl - DCMI-based NPU device library
//!
//! This library detects the installed Ascend generation, exposes a uniform
//! device interface over it, and manages virtual NPU partitions.
//!
//! # Modules
//!
//! - [`backend`]: Per-generation device backends
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`container`]: Container runtime transport helpers
//! - [`dcmi`]: DCMI driver abstraction layer
//! - [`detect`]: Chip detection
//! - [`domain`]: Domain models
//! - [`error`]: Error types
//! - [`manager`]: Device manager
//! - [`vdev`]: Virtual device resource translation

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod container;
pub mod dcmi;
pub mod detect;
pub mod domain;
pub mod error;
pub mod manager;
pub mod vdev;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
pub use manager::DeviceManager;
