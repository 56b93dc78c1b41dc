// src/utils.rs
use actix_web::HttpRequest;
use log::warn;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Client address as seen through the proxy layer: first hop of
/// X-Forwarded-For when present, otherwise the socket peer address.
pub fn extract_peer_ip(req: &HttpRequest) -> Option<IpAddr> {
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(ip_str) = forwarded_for.to_str() {
            if let Some(first_ip) = ip_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    req.peer_addr().map(|addr| addr.ip())
}

/// Clients cannot route to IPv6 servers, so an IPv6 peer is announced in IPv4
/// form: the embedded address for v4-mapped/compatible peers, the low 32 bits
/// otherwise.
pub fn normalize_server_address(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => {
            warn!("game server registering from ipv6 address ({}), mapping to ipv4", v6);
            let v4 = v6.to_ipv4().unwrap_or_else(|| {
                let o = v6.octets();
                Ipv4Addr::new(o[12], o[13], o[14], o[15])
            });
            v4.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_passes_through() {
        let ip: IpAddr = "192.0.2.10".parse().unwrap();
        assert_eq!(normalize_server_address(ip), "192.0.2.10");
    }

    #[test]
    fn mapped_ipv6_unwraps_to_embedded_ipv4() {
        let ip: IpAddr = "::ffff:192.0.2.10".parse().unwrap();
        assert_eq!(normalize_server_address(ip), "192.0.2.10");
    }

    #[test]
    fn native_ipv6_falls_back_to_low_bits() {
        let ip: IpAddr = "2001:db8::c000:20a".parse().unwrap();
        assert_eq!(normalize_server_address(ip), "192.0.2.10");
    }
}
