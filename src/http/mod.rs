//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, ALPN h2/http1.1 on TLS hops)
//!     → request.rs (request ID, negotiation flags, forwarded path)
//!     → hop handler (origin / relay / edge / presenter)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-Host / X-Origin-Host)
//!     → response.rs (error mapping, JSON error bodies)
//!     → Send to caller
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{NegotiationFlags, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::HopServer;
