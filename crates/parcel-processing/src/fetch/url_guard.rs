//! SSRF guard for document URLs
//!
//! Rejects URLs that would make the server fetch from itself or from the private
//! network: non-http(s) schemes, hosts outside the optional allowlist, private and
//! loopback addresses, and hostnames that resolve to them.

use std::net::{IpAddr, Ipv6Addr};
use tokio::net::lookup_host;

use super::FetchError;

/// Validate a submitted document URL and return it parsed.
pub async fn validate_document_url(
    url: &str,
    allow_private_hosts: bool,
    allowlist: Option<&[String]>,
) -> Result<reqwest::Url, FetchError> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(FetchError::InvalidUrl(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| FetchError::InvalidUrl("URL must have a host".to_string()))?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_lowercase();

    if let Some(allowed_domains) = allowlist {
        let is_allowed = allowed_domains.iter().any(|allowed| {
            let allowed = allowed.to_lowercase();
            host == allowed || host.ends_with(&format!(".{}", allowed))
        });

        if !is_allowed {
            return Err(FetchError::Blocked(format!(
                "host '{}' is not in the allowed list",
                host
            )));
        }
    }

    if allow_private_hosts {
        return Ok(parsed);
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(FetchError::Blocked(
                "private/internal IP addresses are not allowed".to_string(),
            ));
        }
    }

    if host == "localhost"
        || host.ends_with(".localhost")
        || host.ends_with(".local")
        || host.contains(".internal")
    {
        return Err(FetchError::Blocked(
            "localhost and internal hostnames are not allowed".to_string(),
        ));
    }

    // Resolve to catch public names pointing at private addresses.
    let port = parsed.port_or_known_default().unwrap_or(443);
    match lookup_host((host.as_str(), port)).await {
        Ok(addrs) => {
            for addr in addrs {
                if is_private_ip(&addr.ip()) {
                    return Err(FetchError::Blocked(format!(
                        "host resolves to private/internal IP address: {}",
                        addr.ip()
                    )));
                }
            }
        }
        Err(e) => {
            tracing::warn!(host = %host, error = %e, "Failed to resolve document host");
        }
    }

    Ok(parsed)
}

/// Private, loopback, link-local, multicast and reserved ranges (IPv4 and IPv6).
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            octets[0] == 10
                || (octets[0] == 172 && (16..=31).contains(&octets[1]))
                || (octets[0] == 192 && octets[1] == 168)
                || octets[0] == 127
                || (octets[0] == 169 && octets[1] == 254)
                || (224..=239).contains(&octets[0])
                || octets[0] == 0
        }
        IpAddr::V6(ipv6) => {
            // ::ffff:a.b.c.d and ::a.b.c.d reach the embedded IPv4 address.
            if let Some(ipv4) = ipv6.to_ipv4() {
                return is_private_ip(&IpAddr::V4(ipv4));
            }
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || ipv6.is_multicast()
                || is_ipv6_link_local(ipv6)
                || is_ipv6_unique_local(ipv6)
        }
    }
}

fn is_ipv6_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

fn is_ipv6_unique_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}
