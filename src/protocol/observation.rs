//! Observation and aggregation types.

use axum::http::Version;
use serde::{Deserialize, Serialize};

/// Wire name of an HTTP version, as reported by every hop.
pub fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/unknown",
    }
}

/// The protocol a hop saw on its own inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolObservation {
    #[serde(rename = "protocol")]
    pub request_protocol: String,
}

impl ProtocolObservation {
    /// Record the version of an inbound request.
    pub fn observe(version: Version) -> Self {
        Self {
            request_protocol: protocol_name(version).to_string(),
        }
    }
}

/// The edge's composed view of one pass through the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResponse {
    /// Status code of the edge's call to the relay, as a decimal string.
    #[serde(rename = "code")]
    pub response_code: String,

    /// Protocol of the edge's call to the relay.
    #[serde(rename = "protocol")]
    pub response_protocol: String,

    /// What the relay observed on its inbound connection.
    #[serde(rename = "proxy_response")]
    pub relay_observation: ProtocolObservation,

    /// What the origin observed on its inbound connection.
    #[serde(rename = "server_response")]
    pub origin_observation: ProtocolObservation,
}
