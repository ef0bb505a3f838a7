//! Chip command implementation
//!
//! Runs chip detection only, without selecting a backend.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, ChipOutput};
use crate::dcmi::DcmiDriver;
use crate::detect;
use crate::error::Result;

/// Execute the chip command
pub fn run_chip<D: DcmiDriver>(driver: &mut D, format: OutputFormat) -> Result<()> {
    let chip = detect::detect(driver)?;
    print_output(&ChipOutput::from(&chip), format)?;
    Ok(())
}
