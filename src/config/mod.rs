//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ChainConfig (validated, immutable)
//!     → one HopContext per hop, built at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults so the demo runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ChainConfig, HopConfig, LimitsConfig, ObservabilityConfig, PresenterConfig, TimeoutConfig,
    TlsFilesConfig,
};
pub use validation::{validate_config, ValidationError};
