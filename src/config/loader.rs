//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ChainConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration file could not be turned into a [`ChainConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ChainConfig, ConfigError> {
    let raw = fs::read_to_string(path)?;
    let config: ChainConfig = toml::from_str(&raw)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
