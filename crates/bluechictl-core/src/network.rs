//! IP address helpers
//!
//! Used to turn a host given on the command line or in the config file into
//! a D-Bus `tcp:` address.

use bluechi_rs::BluechiError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Check whether `domain` is a literal IPv4 address
///
/// # Examples
///
/// ```
/// use bluechictl_core::network::is_ipv4_addr;
///
/// assert!(is_ipv4_addr("192.168.1.10"));
/// assert!(!is_ipv4_addr("::1"));
/// assert!(!is_ipv4_addr("controller.local"));
/// ```
pub fn is_ipv4_addr(domain: &str) -> bool {
    domain.parse::<Ipv4Addr>().is_ok()
}

/// Check whether `domain` is a literal IPv6 address
pub fn is_ipv6_addr(domain: &str) -> bool {
    domain.parse::<Ipv6Addr>().is_ok()
}

/// Resolve `domain` and return the first address in textual form
///
/// Literal addresses are returned as-is without a lookup.
pub async fn get_address(domain: &str) -> Result<String, BluechiError> {
    if is_ipv4_addr(domain) || is_ipv6_addr(domain) {
        return Ok(domain.to_string());
    }

    let mut addrs = tokio::net::lookup_host((domain, 0))
        .await
        .map_err(|e| BluechiError::AddressResolution {
            host: domain.to_string(),
            reason: e.to_string(),
        })?;

    let addr = addrs.next().ok_or_else(|| BluechiError::AddressResolution {
        host: domain.to_string(),
        reason: "no addresses found".to_string(),
    })?;

    tracing::debug!("Resolved {} to {}", domain, addr.ip());
    Ok(addr.ip().to_string())
}

/// Escape a value for use inside a D-Bus address
///
/// Only `[-0-9A-Za-z_/.\*]` may appear unescaped; everything else is
/// written as `%xx`.
pub fn escape_address_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'/' | b'.' | b'\\' | b'*') {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{:02x}", byte));
        }
    }
    escaped
}

/// Build a `tcp:` D-Bus address for `host:port`, resolving `host` if needed
pub async fn tcp_bus_address(host: &str, port: u16) -> Result<String, BluechiError> {
    // Accept the bracketed form people copy from URLs
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(BluechiError::InvalidArgument("empty host name".to_string()));
    }

    let ip = get_address(host).await?;
    let family = match ip.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => "ipv6",
        _ => "ipv4",
    };

    Ok(format!(
        "tcp:host={},port={},family={}",
        escape_address_value(&ip),
        port,
        family
    ))
}
