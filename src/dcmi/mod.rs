//! DCMI abstraction layer
//!
//! Provides trait-based abstractions over the vendor driver for testability.

pub mod ffi;
pub mod library;
pub mod traits;

pub use library::DcmiLibrary;
pub use traits::{DcmiDriver, RawVDevInfo, MAX_VDEV_NUM};
