//! Response handling and transformation.
//!
//! # Responsibilities
//! - Map chain errors to HTTP status codes
//! - Render error bodies as JSON so the next hop up can report them
//!
//! # Design Decisions
//! - Errors never produce a partially tagged body
//! - Downstream failure statuses are forwarded, never masked as success
//! - Chain timeouts result in 504 Gateway Timeout

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ChainError;

/// JSON body of every error response in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&ChainError> for ErrorBody {
    fn from(err: &ChainError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ChainError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}

/// Best-effort summary of a failed downstream body for error messages.
pub fn describe_body(body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return parsed.message;
    }

    const MAX: usize = 256;
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX {
        let cut: String = trimmed.chars().take(MAX).collect();
        format!("{}...", cut)
    } else {
        trimmed.to_string()
    }
}
