//! Destination validation and name resolution.

use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

const MAX_HOSTNAME_LEN: usize = 255;

lazy_static! {
    static ref LABEL: Regex = Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
        .expect("hostname label pattern is valid");
}

/// Accepts dotted-decimal IPv4 addresses only.
pub fn validate_ip(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

/// Accepts names of 1 to 255 characters whose dot-separated labels are
/// 1 to 63 alphanumerics or hyphens, not starting or ending with a hyphen.
pub fn validate_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    hostname.split('.').all(|label| LABEL.is_match(label))
}

/// Looks up the first IPv4 address of `host`. Failures are logged and
/// reported as `None`.
pub fn resolve_host(host: &str) -> Option<Ipv4Addr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Some(ip);
    }

    let addrs = match (host, 0).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!("Cannot resolve hostname {}: {}", host, e);
            return None;
        }
    };
    let resolved = addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .next();
    match resolved {
        Some(ip) => debug!("resolved {} to {}", host, ip),
        None => warn!("Cannot resolve hostname {}: no IPv4 address", host),
    }
    resolved
}
