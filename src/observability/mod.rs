//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every hop produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (per-hop counters and latency histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all hops in `x-request-id`
//! - Metrics are labelled by hop role and observed protocol

pub mod logging;
pub mod metrics;
