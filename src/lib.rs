//! Protocol relay library.
//!
//! Four hops in a fixed chain report which HTTP version each outbound call
//! negotiated:
//!
//! ```text
//! Presenter → Edge → Relay → Origin
//! ```

pub mod config;
pub mod error;
pub mod hop;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod resilience;

pub use config::ChainConfig;
pub use error::{ChainError, ChainResult};
pub use hop::{HopRole, HopState};
pub use http::HopServer;
pub use lifecycle::{Shutdown, Supervisor};
pub use protocol::{AggregatedResponse, ProtocolObservation};
