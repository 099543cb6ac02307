//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → timeouts.rs (derive deadline from config + x-chain-deadline-ms)
//!     → outbound call runs under the remaining budget
//!     → remaining budget forwarded to the next hop
//! ```
//!
//! # Design Decisions
//! - Every outbound call has a deadline
//! - An upstream deadline always bounds the downstream one
//! - No retries: a failed hop fails the whole chain

pub mod timeouts;

pub use timeouts::{Deadline, X_CHAIN_DEADLINE_MS};
