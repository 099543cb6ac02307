//! Startup orchestration.
//!
//! # Responsibilities
//! - Load TLS material and derive the pinned trust root
//! - Build each hop's state from its config section
//! - Bind listeners and hand them to the supervisor
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Leaves first: origin, relay, edge, presenter
//! - A hop's downstream scheme follows the next hop's own `tls` flag

use std::path::Path;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ChainConfig, HopConfig};
use crate::error::ChainError;
use crate::hop::{Downstream, HopContext, HopRole, HopState};
use crate::http::HopServer;
use crate::lifecycle::supervisor::Supervisor;
use crate::net::{TlsMaterial, TransportSelector};

/// Errors that prevent the chain from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Configuration(#[from] ChainError),

    #[error("{role}: failed to bind {address}: {source}")]
    Bind {
        role: HopRole,
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load TLS files named by `config` and start every hop.
pub async fn launch(config: &ChainConfig) -> Result<Supervisor, StartupError> {
    let material = TlsMaterial::load(
        Path::new(&config.tls.cert_path),
        Path::new(&config.tls.key_path),
    )
    .await?;
    launch_with(config, &material).await
}

/// Start every hop with already loaded TLS material.
pub async fn launch_with(
    config: &ChainConfig,
    material: &TlsMaterial,
) -> Result<Supervisor, StartupError> {
    let transports = TransportSelector::new(material.trust_root()?, config.timeouts.connect());
    let server_tls = material.server_config().await?;

    let presenter = config.presenter.hop();
    let mut hops: Vec<(HopRole, &HopConfig, Option<bool>)> = vec![
        (HopRole::Origin, &config.origin, None),
        (HopRole::Relay, &config.relay, Some(config.origin.tls)),
        (HopRole::Edge, &config.edge, Some(config.relay.tls)),
    ];
    if config.presenter.enabled {
        hops.push((HopRole::Presenter, &presenter, Some(config.edge.tls)));
    }

    let mut supervisor = Supervisor::new();
    for (role, hop, downstream_tls) in hops {
        let downstream = match downstream_tls {
            Some(tls) => {
                let authority = hop.downstream.as_deref().ok_or_else(|| {
                    ChainError::Configuration(format!("{} has no downstream configured", role))
                })?;
                Some(Downstream::new(authority, tls)?)
            }
            None => None,
        };

        let state = HopState::new(HopContext {
            role,
            downstream,
            transports: transports.clone(),
            request_timeout: config.timeouts.request(),
            max_body_bytes: config.limits.max_body_bytes,
        });

        let tls = hop.tls.then(|| server_tls.clone());
        let listener = bind(role, &hop.bind_address).await?;
        supervisor
            .spawn(HopServer::new(state, tls), listener)
            .map_err(|source| StartupError::Bind {
                role,
                address: hop.bind_address.clone(),
                source,
            })?;
    }

    for (role, addr) in supervisor.addresses() {
        tracing::info!(role = %role, address = %addr, "Hop ready");
    }

    Ok(supervisor)
}

async fn bind(role: HopRole, address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            role,
            address: address.to_string(),
            source,
        })
}

