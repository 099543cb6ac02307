//! Protocol-reporting hops.
//!
//! # Data Flow
//! ```text
//! Presenter ──http──▶ Edge ──TLS h1|h2──▶ Relay ──TLS h1|h2──▶ Origin
//!     ▲                 │                   │                    │
//!     └── HTML ◀── AggregatedResponse ◀── tag~~boundary~~body ◀── observation
//! ```
//!
//! One parameterized hop: a [`HopRole`] picks the handler, a [`HopState`]
//! carries the downstream address and the transport selector. Nothing in the
//! state changes after startup.

pub mod edge;
pub mod origin;
pub mod presenter;
pub mod relay;

use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ChainError, ChainResult};
use crate::net::TransportSelector;

/// Position of a hop in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HopRole {
    Presenter,
    Edge,
    Relay,
    Origin,
}

impl HopRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HopRole::Presenter => "presenter",
            HopRole::Edge => "edge",
            HopRole::Relay => "relay",
            HopRole::Origin => "origin",
        }
    }
}

impl std::fmt::Display for HopRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of the next hop.
#[derive(Debug, Clone)]
pub struct Downstream {
    scheme: Scheme,
    authority: Authority,
}

impl Downstream {
    /// `authority` is `host:port`; `tls` selects `https`.
    pub fn new(authority: &str, tls: bool) -> ChainResult<Self> {
        let authority = Authority::from_str(authority).map_err(|e| {
            ChainError::Configuration(format!("Invalid downstream '{}': {}", authority, e))
        })?;
        let scheme = if tls { Scheme::HTTPS } else { Scheme::HTTP };
        Ok(Self { scheme, authority })
    }

    pub fn authority(&self) -> &str {
        self.authority.as_str()
    }

    /// Absolute URI on the next hop for `path_and_query`.
    pub fn uri_for(&self, path_and_query: &str) -> ChainResult<Uri> {
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|e| {
                ChainError::Configuration(format!("Cannot build downstream URI: {}", e))
            })
    }
}

impl std::fmt::Display for Downstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Immutable per-hop state injected into handlers.
#[derive(Debug)]
pub struct HopContext {
    pub role: HopRole,
    pub downstream: Option<Downstream>,
    pub transports: TransportSelector,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

/// Cheaply cloneable handle to a [`HopContext`].
#[derive(Debug, Clone)]
pub struct HopState {
    inner: Arc<HopContext>,
}

impl HopState {
    pub fn new(context: HopContext) -> Self {
        Self {
            inner: Arc::new(context),
        }
    }

    pub fn role(&self) -> HopRole {
        self.inner.role
    }

    /// The next hop; only the origin has none.
    pub fn downstream(&self) -> ChainResult<&Downstream> {
        self.inner.downstream.as_ref().ok_or_else(|| {
            ChainError::Configuration(format!("{} has no downstream configured", self.inner.role))
        })
    }

    pub fn transports(&self) -> &TransportSelector {
        &self.inner.transports
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    pub fn max_body_bytes(&self) -> usize {
        self.inner.max_body_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_uri_keeps_path_and_query() {
        let downstream = Downstream::new("localhost:8000", true).unwrap();
        let uri = downstream
            .uri_for("/?client-http2=true&proxy-http2=false")
            .unwrap();
        assert_eq!(
            uri.to_string(),
            "https://localhost:8000/?client-http2=true&proxy-http2=false"
        );
    }

    #[test]
    fn plain_downstream_uses_http() {
        let downstream = Downstream::new("127.0.0.1:8002", false).unwrap();
        assert_eq!(downstream.to_string(), "http://127.0.0.1:8002");
    }

    #[test]
    fn invalid_authority_is_configuration_error() {
        let err = Downstream::new("bad host:1", true).unwrap_err();
        assert!(matches!(err, ChainError::Configuration(_)));
    }
}
