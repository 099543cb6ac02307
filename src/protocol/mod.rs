//! In-band aggregation protocol.
//!
//! # Data Flow
//! ```text
//! Origin  → ProtocolObservation (JSON body)
//! Relay   → <relay observation JSON> ~~boundary~~ <origin body verbatim>
//! Edge    → split on the sentinel → AggregatedResponse (JSON body)
//! ```
//!
//! # Design Decisions
//! - Observations are plain serde structs; the wire names match the demo front-end
//! - Framing is strict: exactly one sentinel, both segments must parse

pub mod framing;
pub mod observation;

pub use framing::{decode_relay_body, encode_relay_body, DecodeError, Segment, SENTINEL};
pub use observation::{protocol_name, AggregatedResponse, ProtocolObservation};
