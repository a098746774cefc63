use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;
use serde_json::{Map, Value};

pub const UNKNOWN_IP: &str = "unknown";

/// Best-effort client address for request logs.
///
/// Forwarding headers are honored when no trusted proxies are configured, or
/// when the direct peer is one of them. Falls back to the peer address, then
/// to [`UNKNOWN_IP`].
///
/// With an empty proxy list any client can choose the address that gets
/// logged. Deployments that care should set `MOCKAPI_TRUSTED_PROXIES`, which
/// limits forwarding headers to requests arriving through those proxies.
pub fn client_ip(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> String {
    let is_trusted = |ip: &IpAddr| trusted_proxies.iter().any(|net| net.contains(ip));
    let honor_forwarded = trusted_proxies.is_empty() || peer_addr.as_ref().is_some_and(is_trusted);

    if honor_forwarded {
        if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            // Leftmost address that isn't one of our own proxies
            for ip_str in xff.split(',').map(|s| s.trim()) {
                if let Ok(ip) = ip_str.parse::<IpAddr>() {
                    if !is_trusted(&ip) {
                        return ip.to_string();
                    }
                }
            }
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return ip.to_string();
        }
    }

    peer_addr
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// Request headers as a JSON object. Repeated headers are comma-joined and
/// non-UTF-8 values are skipped.
pub fn header_snapshot(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        match map.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                map.insert(name.as_str().to_string(), Value::String(value.to_string()));
            }
        }
    }
    Value::Object(map)
}
