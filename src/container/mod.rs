//! Container runtime transport helpers
//!
//! Just enough plumbing to reach a runtime over its unix socket and to check
//! container-facing names. Talking the runtime's protocol is left to callers.

pub mod dns;
pub mod endpoint;

pub use dns::validate_dns_name;
pub use endpoint::{connect, Endpoint, IO_TIMEOUT, DEFAULT_ENDPOINT};
