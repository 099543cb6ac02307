//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the chain.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the four-hop chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Certificate and key shared by every TLS hop.
    pub tls: TlsFilesConfig,

    /// Terminal hop: reports its inbound protocol only.
    pub origin: HopConfig,

    /// Intermediate hop: tags and forwards to the origin.
    pub relay: HopConfig,

    /// Externally visible hop: aggregates the chain.
    pub edge: HopConfig,

    /// HTML front-end in front of the edge.
    pub presenter: PresenterConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            tls: TlsFilesConfig::default(),
            origin: HopConfig {
                bind_address: "0.0.0.0:8000".to_string(),
                tls: true,
                downstream: None,
            },
            relay: HopConfig {
                bind_address: "0.0.0.0:8001".to_string(),
                tls: true,
                downstream: Some("localhost:8000".to_string()),
            },
            edge: HopConfig {
                bind_address: "0.0.0.0:8002".to_string(),
                tls: false,
                downstream: Some("localhost:8001".to_string()),
            },
            presenter: PresenterConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// TLS material file locations (PEM).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsFilesConfig {
    /// Certificate served by TLS hops and trusted as the only root.
    pub cert_path: String,

    /// Private key for `cert_path`.
    pub key_path: String,
}

impl Default for TlsFilesConfig {
    fn default() -> Self {
        Self {
            cert_path: "server.crt".to_string(),
            key_path: "server.key".to_string(),
        }
    }
}

/// Listener settings for one hop.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HopConfig {
    /// Bind address (e.g., "0.0.0.0:8001").
    pub bind_address: String,

    /// Serve this hop over TLS.
    #[serde(default)]
    pub tls: bool,

    /// Authority of the next hop (e.g., "localhost:8000").
    #[serde(default)]
    pub downstream: Option<String>,
}

/// Presenter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Start the HTML front-end.
    pub enabled: bool,

    /// Bind address for the front-end.
    pub bind_address: String,

    /// Serve the front-end over TLS.
    pub tls: bool,

    /// Authority of the edge.
    pub downstream: Option<String>,
}

impl PresenterConfig {
    /// Listener view shared with the other hops.
    pub fn hop(&self) -> HopConfig {
        HopConfig {
            bind_address: self.bind_address.clone(),
            tls: self.tls,
            downstream: self.downstream.clone(),
        }
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8003".to_string(),
            tls: false,
            downstream: Some("localhost:8002".to_string()),
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Total budget for one request through the rest of the chain, in milliseconds.
    pub request_ms: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            request_ms: 30_000,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound or buffered downstream body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
