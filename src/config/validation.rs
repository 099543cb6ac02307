//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate bind addresses and downstream authorities
//! - Detect hops sharing one bind address
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ChainConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::uri::Authority;
use std::collections::HashMap;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ChainConfig, HopConfig};

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{hop}: invalid bind address '{address}'")]
    InvalidBindAddress { hop: &'static str, address: String },

    #[error("{hop} and {other} both bind {address}")]
    DuplicateBindAddress {
        hop: &'static str,
        other: &'static str,
        address: String,
    },

    #[error("{hop}: downstream address is required")]
    MissingDownstream { hop: &'static str },

    #[error("{hop}: invalid downstream authority '{address}'")]
    InvalidDownstream { hop: &'static str, address: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ChainConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let presenter = config.presenter.hop();

    let mut hops: Vec<(&'static str, &HopConfig, bool)> = vec![
        ("origin", &config.origin, false),
        ("relay", &config.relay, true),
        ("edge", &config.edge, true),
    ];
    if config.presenter.enabled {
        hops.push(("presenter", &presenter, true));
    }

    let mut bound: HashMap<SocketAddr, &'static str> = HashMap::new();
    for (name, hop, needs_downstream) in hops {
        match hop.bind_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Some(other) = bound.insert(addr, name) {
                    errors.push(ValidationError::DuplicateBindAddress {
                        hop: name,
                        other,
                        address: hop.bind_address.clone(),
                    });
                }
            }
            Err(_) => errors.push(ValidationError::InvalidBindAddress {
                hop: name,
                address: hop.bind_address.clone(),
            }),
        }

        if needs_downstream {
            match hop.downstream.as_deref() {
                None => errors.push(ValidationError::MissingDownstream { hop: name }),
                Some(address) if !is_authority(address) => {
                    errors.push(ValidationError::InvalidDownstream {
                        hop: name,
                        address: address.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_ms" });
    }
    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.connect_ms" });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_bytes" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A downstream must be a bare `host:port` authority.
fn is_authority(address: &str) -> bool {
    match address.parse::<Authority>() {
        Ok(authority) => authority.port_u16().is_some() && !address.contains('@'),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ChainConfig::default()).is_ok());
    }

    #[test]
    fn duplicate_bind_addresses_are_reported() {
        let mut config = ChainConfig::default();
        config.edge.bind_address = config.relay.bind_address.clone();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::DuplicateBindAddress { hop: "edge", other: "relay", .. }
        )));
    }

    #[test]
    fn downstream_must_be_host_and_port() {
        let mut config = ChainConfig::default();
        config.relay.downstream = Some("https://localhost:8000/path".into());
        config.edge.downstream = None;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidDownstream {
            hop: "relay",
            address: "https://localhost:8000/path".into(),
        }));
        assert!(errors.contains(&ValidationError::MissingDownstream { hop: "edge" }));
    }

    #[test]
    fn disabled_presenter_is_not_checked() {
        let mut config = ChainConfig::default();
        config.presenter.enabled = false;
        config.presenter.downstream = None;
        assert!(validate_config(&config).is_ok());
    }
}
