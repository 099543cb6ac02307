//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the caller sent none
//! - Extract per-request negotiation flags from the query string
//! - Extract the routing-relevant pieces forwarded to the next hop (host, path, query)
//!
//! # Design Decisions
//! - Request ID added as early as possible and reused by every downstream hop
//! - Flags are recomputed from each request; nothing is remembered between requests
//! - The query string is forwarded verbatim, never re-encoded

use axum::http::{header, HeaderMap, HeaderName, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the chain-wide request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Query parameter selecting HTTP/2 for the edge's outbound call.
pub const CLIENT_HTTP2_PARAM: &str = "client-http2";

/// Query parameter selecting HTTP/2 for the relay's outbound call.
pub const PROXY_HTTP2_PARAM: &str = "proxy-http2";

/// Which outbound hops negotiate HTTP/2 for this request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NegotiationFlags {
    pub edge_uses_http2: bool,
    pub relay_uses_http2: bool,
}

impl NegotiationFlags {
    /// Only the exact value `true` enables a flag. The first occurrence wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut edge = None;
        let mut relay = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            if key == CLIENT_HTTP2_PARAM && edge.is_none() {
                edge = Some(value == "true");
            } else if key == PROXY_HTTP2_PARAM && relay.is_none() {
                relay = Some(value == "true");
            }
        }

        Self {
            edge_uses_http2: edge.unwrap_or(false),
            relay_uses_http2: relay.unwrap_or(false),
        }
    }

    pub fn from_uri(uri: &Uri) -> Self {
        Self::from_query(uri.query())
    }

    /// Query string that sets exactly these flags.
    pub fn to_query(&self) -> String {
        format!(
            "{}={}&{}={}",
            CLIENT_HTTP2_PARAM, self.edge_uses_http2, PROXY_HTTP2_PARAM, self.relay_uses_http2
        )
    }
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeChainRequestId;

impl MakeRequestId for MakeChainRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Request ID for logging, or "unknown" when the layer did not run.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Host the caller addressed: the `Host` header for HTTP/1, the URI authority for HTTP/2.
pub fn inbound_host<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

/// Path and query to reuse on the downstream URL.
pub fn forwarded_path(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}
