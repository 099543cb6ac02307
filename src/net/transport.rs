//! Per-call transport selection.
//!
//! # Responsibilities
//! - Turn a negotiation flag into an HTTP/1.1 or HTTP/2 client over TLS
//! - Verify the peer against the pinned trust root only
//! - Issue exactly the protocol that was selected
//!
//! # Design Decisions
//! - A fresh client per outbound call; requests with opposite flags never share state
//! - HTTP/2 offers ALPN `h2` only; HTTP/1.1 offers no ALPN, so the server falls back to HTTP/1.1
//! - The crypto provider is passed explicitly instead of installing a process default

use axum::body::{Body, Bytes};
use axum::http::{response, Request, Response, Version};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use rustls::ClientConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ChainError, ChainResult};
use crate::net::tls::TrustRoot;

/// Default connect timeout used by [`select`].
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Application protocol of an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Http1,
    Http2,
}

impl TransportKind {
    pub fn from_flag(use_http2: bool) -> Self {
        if use_http2 {
            TransportKind::Http2
        } else {
            TransportKind::Http1
        }
    }

    /// Version stamped on every request issued through this kind.
    pub fn version(self) -> Version {
        match self {
            TransportKind::Http1 => Version::HTTP_11,
            TransportKind::Http2 => Version::HTTP_2,
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Http1 => write!(f, "http/1.1"),
            TransportKind::Http2 => write!(f, "h2"),
        }
    }
}

/// Builds transports from the shared trust root.
#[derive(Debug, Clone)]
pub struct TransportSelector {
    trust_root: TrustRoot,
    connect_timeout: Duration,
}

impl TransportSelector {
    pub fn new(trust_root: TrustRoot, connect_timeout: Duration) -> Self {
        Self {
            trust_root,
            connect_timeout,
        }
    }

    /// Build a transport for one outbound call.
    pub fn select(&self, use_http2: bool) -> ChainResult<Transport> {
        let kind = TransportKind::from_flag(use_http2);
        let tls = self.client_config()?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(self.connect_timeout));

        let builder = HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http();

        let client = match kind {
            TransportKind::Http1 => Client::builder(TokioExecutor::new())
                .build(builder.enable_http1().wrap_connector(http)),
            TransportKind::Http2 => Client::builder(TokioExecutor::new())
                .http2_only(true)
                .build(builder.enable_http2().wrap_connector(http)),
        };

        Ok(Transport { kind, client })
    }

    fn client_config(&self) -> ChainResult<ClientConfig> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| ChainError::Configuration(format!("TLS client setup failed: {}", e)))?
            .with_root_certificates(self.trust_root.root_store())
            .with_no_client_auth();
        Ok(config)
    }
}

/// Select a transport with the default connect timeout.
pub fn select(use_http2: bool, trust_root: &TrustRoot) -> ChainResult<Transport> {
    TransportSelector::new(trust_root.clone(), DEFAULT_CONNECT_TIMEOUT).select(use_http2)
}

/// A single-use outbound client speaking one protocol.
pub struct Transport {
    kind: TransportKind,
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl Transport {
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Issue a request. The request version is forced to the selected protocol.
    pub async fn issue(&self, mut request: Request<Body>) -> ChainResult<Response<Incoming>> {
        *request.version_mut() = self.kind.version();

        tracing::debug!(
            uri = %request.uri(),
            method = %request.method(),
            transport = %self.kind,
            "Issuing outbound request"
        );

        self.client
            .request(request)
            .await
            .map_err(|e| ChainError::Transport(error_chain(&e)))
    }
}

/// Buffer a downstream response body up to `limit` bytes.
pub async fn collect(
    response: Response<Incoming>,
    limit: usize,
) -> ChainResult<(response::Parts, Bytes)> {
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(Body::new(body), limit)
        .await
        .map_err(|e| ChainError::Transport(format!("Failed reading downstream body: {}", e)))?;
    Ok((parts, bytes))
}

/// Render an error with all of its sources; hyper's top-level messages are terse.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
