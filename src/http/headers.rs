//! Header manipulation for forwarded requests.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers and `Host` before forwarding
//! - Add `X-Forwarded-Host` and `X-Origin-Host`
//! - Carry the request ID and remaining deadline to the next hop

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::http::request::X_REQUEST_ID;
use crate::resilience::{Deadline, X_CHAIN_DEADLINE_MS};

pub static X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub static X_ORIGIN_HOST: HeaderName = HeaderName::from_static("x-origin-host");

/// Headers meaningful only for a single connection (RFC 9110 §7.6.1).
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
];

/// Copy of `inbound` suitable for the next hop.
pub fn forward_headers(
    inbound: &HeaderMap,
    forwarded_host: Option<&str>,
    origin_host: &str,
    deadline: &Deadline,
) -> HeaderMap {
    let mut headers = inbound.clone();

    // Connection may name further per-connection headers.
    let named: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    for name in named {
        headers.remove(name.as_str());
    }

    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(header::UPGRADE);
    headers.remove(header::HOST);

    if let Some(host) = forwarded_host.and_then(|h| HeaderValue::from_str(h).ok()) {
        headers.append(X_FORWARDED_HOST.clone(), host);
    }
    if let Ok(origin) = HeaderValue::from_str(origin_host) {
        headers.insert(X_ORIGIN_HOST.clone(), origin);
    }
    headers.insert(X_CHAIN_DEADLINE_MS, deadline.header_value());

    headers
}

/// Minimal header set for a fresh call that starts a new leg of the chain.
pub fn outbound_headers(request_id: &str, deadline: &Deadline) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(id) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID.clone(), id);
    }
    headers.insert(X_CHAIN_DEADLINE_MS, deadline.header_value());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn strips_hop_by_hop_and_host() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("relay:8001"));
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-private"));
        inbound.insert("x-private", HeaderValue::from_static("secret"));
        inbound.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        inbound.insert("x-request-id", HeaderValue::from_static("abc"));

        let deadline = Deadline::after(Duration::from_secs(1));
        let out = forward_headers(&inbound, Some("relay:8001"), "origin:8000", &deadline);

        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get("x-private").is_none());
        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out.get("x-request-id").unwrap(), "abc");
        assert_eq!(out.get(&X_FORWARDED_HOST).unwrap(), "relay:8001");
        assert_eq!(out.get(&X_ORIGIN_HOST).unwrap(), "origin:8000");
        assert!(out.get(X_CHAIN_DEADLINE_MS).is_some());
    }

    #[test]
    fn existing_forwarded_host_is_appended() {
        let mut inbound = HeaderMap::new();
        inbound.insert(&X_FORWARDED_HOST, HeaderValue::from_static("edge:8002"));

        let deadline = Deadline::after(Duration::from_secs(1));
        let out = forward_headers(&inbound, Some("relay:8001"), "origin:8000", &deadline);

        let hosts: Vec<_> = out.get_all(&X_FORWARDED_HOST).iter().collect();
        assert_eq!(hosts, vec!["edge:8002", "relay:8001"]);
    }
}
