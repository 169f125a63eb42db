//! Client identification utilities

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract the client IP address used as the rate-limit key.
///
/// `X-Forwarded-For` is only honoured when `trust_forwarded` is set, i.e.
/// when the service runs behind a reverse proxy that overwrites it.
/// Otherwise any client could pick its own key.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded: bool,
) -> Option<IpAddr> {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|xff| xff.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    direct_ip
}
