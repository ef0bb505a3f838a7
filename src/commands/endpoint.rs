//! Endpoint and name check commands
//!
//! These touch the container runtime side only and never load the driver.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, Message};
use crate::container::{self, Endpoint};
use crate::error::Result;

/// Check that the runtime socket accepts a connection
pub fn run_endpoint(uri: &str, format: OutputFormat) -> Result<()> {
    let endpoint = Endpoint::parse(uri)?;
    container::connect(uri)?;
    print_output(&Message::ok(format!("Connected to {}", endpoint)), format)?;
    Ok(())
}

/// Validate a name as a DNS label
pub fn run_check_name(name: &str, format: OutputFormat) -> Result<()> {
    container::validate_dns_name(name)?;
    print_output(&Message::ok(format!("'{}' is a valid name", name)), format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, TransportError};
    use std::os::unix::net::UnixListener;

    #[test]
    fn test_run_endpoint_connects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.sock");
        let _listener = UnixListener::bind(&path).unwrap();

        let uri = format!("unix://{}", path.display());
        run_endpoint(&uri, OutputFormat::Json).unwrap();
    }

    #[test]
    fn test_run_endpoint_rejects_tcp() {
        let err = run_endpoint("tcp://127.0.0.1:2375", OutputFormat::Json).unwrap_err();
        assert!(matches!(
            err,
            AppError::Transport(TransportError::UnsupportedProtocol(_))
        ));
    }

    #[test]
    fn test_run_check_name() {
        assert!(run_check_name("npu-worker", OutputFormat::Json).is_ok());
        assert!(matches!(
            run_check_name("Bad_Name", OutputFormat::Json),
            Err(AppError::Transport(TransportError::InvalidDnsName(_)))
        ));
    }
}
