//! Error taxonomy for the request path.
//!
//! Every hop converts its failures into a [`ChainError`]; the HTTP mapping
//! lives in `http::response`.

use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::protocol::DecodeError;

/// Errors that can occur while a hop handles a request.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Trust material or downstream address is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Outbound TLS, connect or body transfer failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The relay's tagged body could not be split into its two observations.
    #[error("protocol decode error: {0}")]
    ProtocolDecode(#[from] DecodeError),

    /// The next hop answered with a non-success status.
    #[error("upstream returned {status}: {detail}")]
    Upstream { status: StatusCode, detail: String },

    /// The chain deadline elapsed before the downstream call completed.
    #[error("deadline exceeded after {0:?}")]
    Timeout(Duration),
}

impl ChainError {
    /// Short machine-readable kind used in error bodies and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::Configuration(_) => "configuration",
            ChainError::Transport(_) => "transport",
            ChainError::ProtocolDecode(_) => "protocol_decode",
            ChainError::Upstream { .. } => "upstream",
            ChainError::Timeout(_) => "timeout",
        }
    }

    /// Status code this error is surfaced with.
    pub fn status(&self) -> StatusCode {
        match self {
            ChainError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChainError::Transport(_) | ChainError::ProtocolDecode(_) => StatusCode::BAD_GATEWAY,
            ChainError::Upstream { status, .. } => {
                if status.is_client_error() || status.is_server_error() {
                    *status
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            ChainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

/// Result alias for hop operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_keeps_failure_status() {
        let err = ChainError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: String::new(),
        };
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_error_never_reports_success() {
        let err = ChainError::Upstream {
            status: StatusCode::MOVED_PERMANENTLY,
            detail: "redirect".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = ChainError::Timeout(Duration::from_millis(5));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.kind(), "timeout");
    }
}
