//! SSRF (Server-Side Request Forgery) protection.
//!
//! Scans fetch whatever a caller hands us plus whatever a page links to, so
//! every hop is checked against private, internal and reserved addresses.
use std::net::IpAddr;

use url::{Host, Url};

/// Error type for SSRF validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked scheme: {0}")]
    BlockedScheme(String),

    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed: {0}")]
    DnsError(String),
}

/// Check if an IP address is private, reserved, or otherwise blocked.
///
/// This covers:
/// - Loopback addresses (127.0.0.0/8, ::1)
/// - RFC 1918 private ranges (10/8, 172.16/12, 192.168/16)
/// - Link-local addresses (169.254/16, fe80::/10)
/// - Multicast addresses (224/4, ff00::/8)
/// - Unspecified addresses (0.0.0.0/8, ::)
/// - IPv6 unique local (fc00::/7)
/// - IPv4-mapped IPv6 addresses of any of the above
pub fn is_private_or_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_or_reserved(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Validate that an IP address is not private or reserved.
///
/// Returns an error if the IP is blocked.
pub fn validate_ip(ip: IpAddr) -> Result<(), SsrfError> {
    if is_private_or_reserved(ip) { Err(SsrfError::BlockedIp(ip)) } else { Ok(()) }
}

/// Validate a URL before it is requested.
///
/// IP literals are checked directly; hostnames are resolved and every
/// A/AAAA answer must be public.
pub async fn check_url(url: &Url) -> Result<(), SsrfError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(SsrfError::BlockedScheme(scheme.to_string())),
    }

    let port = url.port_or_known_default().unwrap_or(443);
    match url.host() {
        Some(Host::Ipv4(v4)) => validate_ip(IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => validate_ip(IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => {
            let addrs = tokio::net::lookup_host((domain, port))
                .await
                .map_err(|e| SsrfError::DnsError(e.to_string()))?;

            let mut resolved_any = false;
            for addr in addrs {
                resolved_any = true;
                validate_ip(addr.ip())?;
            }

            if resolved_any { Ok(()) } else { Err(SsrfError::DnsError(format!("no addresses for {domain}"))) }
        }
        None => Err(SsrfError::DnsError("URL has no host".to_string())),
    }
}
