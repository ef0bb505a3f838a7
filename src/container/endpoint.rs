//! Runtime endpoint parsing and connection

use crate::error::TransportError;

use std::fmt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Socket read/write timeout
pub const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// containerd's default socket
pub const DEFAULT_ENDPOINT: &str = "unix:///run/containerd/containerd.sock";

/// A parsed runtime endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    /// Recognized but not connectable
    Tcp(String),
}

impl Endpoint {
    /// Parse a `scheme://address` URI
    pub fn parse(uri: &str) -> Result<Self, TransportError> {
        if uri.is_empty() {
            return Err(TransportError::EndpointNotSet);
        }

        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| TransportError::InvalidEndpoint(uri.to_string()))?;

        match scheme {
            "unix" if !rest.is_empty() => Ok(Self::Unix(PathBuf::from(rest))),
            "tcp" if !rest.is_empty() => {
                // host[:port], path segments are not part of the address
                let host = rest.split('/').next().unwrap_or(rest);
                Ok(Self::Tcp(host.to_string()))
            }
            "unix" | "tcp" => Err(TransportError::InvalidEndpoint(uri.to_string())),
            other => Err(TransportError::UnsupportedProtocol(other.to_string())),
        }
    }

    /// Scheme name
    pub fn protocol(&self) -> &'static str {
        match self {
            Self::Unix(_) => "unix",
            Self::Tcp(_) => "tcp",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", mask_path(path)),
            Self::Tcp(host) => write!(f, "tcp://{}", host),
        }
    }
}

/// Hide everything but the final path component
pub fn mask_path(path: &Path) -> String {
    match path.file_name() {
        Some(name) if path.parent().is_some_and(|p| !p.as_os_str().is_empty()) => {
            format!("***/{}", name.to_string_lossy())
        }
        _ => path.display().to_string(),
    }
}

/// Connect to a runtime's unix socket
///
/// Read and write timeouts are set to [`IO_TIMEOUT`]; the connect itself is
/// not time-bounded. TCP endpoints parse but are refused here.
pub fn connect(uri: &str) -> Result<UnixStream, TransportError> {
    let endpoint = Endpoint::parse(uri).inspect_err(|e| log::error!("{}", e))?;

    let path = match &endpoint {
        Endpoint::Unix(path) => path,
        Endpoint::Tcp(_) => {
            let err = TransportError::UnsupportedProtocol(endpoint.protocol().to_string());
            log::error!("{}", err);
            return Err(err);
        }
    };

    log::debug!(
        "Connecting to {} with {:?} I/O timeout",
        endpoint,
        IO_TIMEOUT
    );
    let stream = UnixStream::connect(path)?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    log::debug!("Connected to {}", endpoint);

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;

    #[test]
    fn test_parse() {
        assert_eq!(
            Endpoint::parse(DEFAULT_ENDPOINT).unwrap(),
            Endpoint::Unix(PathBuf::from("/run/containerd/containerd.sock"))
        );
        assert_eq!(
            Endpoint::parse("tcp://localhost:2375/v1").unwrap(),
            Endpoint::Tcp("localhost:2375".to_string())
        );
        assert!(matches!(
            Endpoint::parse(""),
            Err(TransportError::EndpointNotSet)
        ));
        assert!(matches!(
            Endpoint::parse("npipe:////./pipe/docker"),
            Err(TransportError::UnsupportedProtocol(ref s)) if s == "npipe"
        ));
        assert!(matches!(
            Endpoint::parse("/run/containerd.sock"),
            Err(TransportError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            Endpoint::parse("unix://"),
            Err(TransportError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_mask_path() {
        assert_eq!(
            mask_path(Path::new("/run/containerd/containerd.sock")),
            "***/containerd.sock"
        );
        assert_eq!(mask_path(Path::new("docker.sock")), "docker.sock");
    }

    #[test]
    fn test_display_masks_path() {
        let endpoint = Endpoint::parse("unix:///var/run/secret/runtime.sock").unwrap();
        assert_eq!(endpoint.to_string(), "unix://***/runtime.sock");
    }

    #[test]
    fn test_connect_rejects_tcp() {
        assert!(matches!(
            connect("tcp://127.0.0.1:2375"),
            Err(TransportError::UnsupportedProtocol(ref s)) if s == "tcp"
        ));
    }

    #[test]
    fn test_connect_missing_socket() {
        assert!(matches!(
            connect("unix:///nonexistent/npuctl-test.sock"),
            Err(TransportError::Connect(_))
        ));
    }

    #[test]
    fn test_connect_sets_timeouts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.sock");
        let _listener = UnixListener::bind(&path).unwrap();

        let stream = connect(&format!("unix://{}", path.display())).unwrap();
        assert_eq!(stream.read_timeout().unwrap(), Some(IO_TIMEOUT));
        assert_eq!(stream.write_timeout().unwrap(), Some(IO_TIMEOUT));
    }
}
