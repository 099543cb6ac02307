//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     tls.rs (load cert + key once, derive the pinned trust root)
//!
//! Per outbound call:
//!     flag → transport.rs (fresh HTTP/1.1 or HTTP/2 client over TLS)
//!          → issue(request) → response
//! ```
//!
//! # Design Decisions
//! - One PEM certificate both serves TLS and is the only trusted root
//! - Transports are never shared between requests
//! - TLS client configs use an explicit crypto provider, never a process default

pub mod tls;
pub mod transport;

pub use tls::{TlsMaterial, TrustRoot};
pub use transport::{Transport, TransportKind, TransportSelector};
