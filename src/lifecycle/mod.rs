//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load TLS material → Derive trust root → Bind listeners → Build hops
//!
//! Supervision (supervisor.rs):
//!     Run every hop → first unexpected exit or signal → shutdown all → join
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Hops share nothing but the immutable trust root and config
//! - Any hop exiting on its own takes the whole chain down

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use startup::{launch, launch_with, StartupError};
pub use supervisor::{Supervisor, SupervisorError};
