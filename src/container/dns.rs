//! DNS label validation for container-facing names

use crate::error::TransportError;

use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

const DNS_NAME_LEN: RangeInclusive<usize> = 2..=63;

fn dns_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+[a-z0-9-]*[a-z0-9]+$").expect("DNS pattern is a valid regex")
    })
}

/// Check that `name` is a lowercase DNS label
pub fn validate_dns_name(name: &str) -> Result<(), TransportError> {
    if !DNS_NAME_LEN.contains(&name.len()) {
        return Err(TransportError::InvalidDnsName(format!(
            "'{}' must be {} to {} characters",
            name,
            DNS_NAME_LEN.start(),
            DNS_NAME_LEN.end()
        )));
    }
    if !dns_pattern().is_match(name) {
        return Err(TransportError::InvalidDnsName(format!(
            "'{}' must be lowercase alphanumerics and '-', not starting or ending with '-'",
            name
        )));
    }
    Ok(())
}
