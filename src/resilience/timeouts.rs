//! Timeout enforcement.
//!
//! # Responsibilities
//! - Derive a per-request deadline from config and the caller's remaining budget
//! - Wrap downstream calls with the remaining budget
//! - Hand the shrunken budget to the next hop
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use axum::http::{HeaderMap, HeaderValue};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{ChainError, ChainResult};

/// Remaining chain budget in milliseconds.
pub const X_CHAIN_DEADLINE_MS: &str = "x-chain-deadline-ms";

/// Point in time by which the rest of the chain must have answered.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    expires_at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            expires_at: started + budget,
        }
    }

    /// The configured budget, narrowed by the caller's remaining budget if it sent one.
    pub fn from_headers(headers: &HeaderMap, configured: Duration) -> Self {
        let inbound = headers
            .get(X_CHAIN_DEADLINE_MS)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis);

        match inbound {
            Some(budget) if budget < configured => Self::after(budget),
            _ => Self::after(configured),
        }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Header value to forward downstream.
    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from(self.remaining().as_millis() as u64)
    }

    /// Run `fut` under the remaining budget.
    pub async fn run<T, F>(&self, fut: F) -> ChainResult<T>
    where
        F: Future<Output = ChainResult<T>>,
    {
        match tokio::time::timeout_at(self.expires_at, fut).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout(self.expires_at - self.started)),
        }
    }
}
