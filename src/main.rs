//! Protocol relay demo (v1)
//!
//! Runs four hops in one process and shows which HTTP version every hop of
//! the chain negotiated.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser
//!      │  GET /?client-http2=true&proxy-http2=false
//!      ▼
//!  ┌───────────┐  http   ┌────────┐  TLS h1|h2  ┌────────┐  TLS h1|h2  ┌────────┐
//!  │ presenter │ ──────▶ │  edge  │ ──────────▶ │ relay  │ ──────────▶ │ origin │
//!  │   :8003   │ ◀────── │ :8002  │ ◀────────── │ :8001  │ ◀────────── │ :8000  │
//!  └───────────┘  JSON   └────────┘  tag~~body  └────────┘ observation └────────┘
//!
//!  Cross-cutting: config (TOML) · tracing · metrics · deadlines · supervisor
//! ```

use clap::Parser;
use std::path::PathBuf;

use protocol_relay::config::{load_config, ChainConfig};
use protocol_relay::lifecycle::{launch, signals::shutdown_signal};
use protocol_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "protocol-relay")]
#[command(about = "Four-hop demo of negotiated HTTP versions across a relay chain", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ChainConfig::default(),
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(config.observability.log_level.as_str());
    logging::init(level);

    tracing::info!("protocol-relay v0.1.0 starting");
    tracing::info!(
        origin = %config.origin.bind_address,
        relay = %config.relay.bind_address,
        edge = %config.edge.bind_address,
        presenter_enabled = config.presenter.enabled,
        request_timeout_ms = config.timeouts.request_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let supervisor = launch(&config).await?;
    supervisor.run_until(shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
