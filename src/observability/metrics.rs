//! Metrics collection and exposition.
//!
//! # Metrics
//! - `chain_hop_requests_total` (counter): requests by role, inbound protocol, status
//! - `chain_hop_request_duration_seconds` (histogram): handling latency by role
//!
//! # Design Decisions
//! - Recorded in one middleware so handlers stay free of bookkeeping
//! - The exporter is optional; without it the macros are no-ops

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::hop::HopRole;
use crate::protocol::protocol_name;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one handled request.
pub fn record_request(role: HopRole, protocol: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "chain_hop_requests_total",
        "role" => role.as_str(),
        "protocol" => protocol,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("chain_hop_request_duration_seconds", "role" => role.as_str())
        .record(start.elapsed().as_secs_f64());
}

/// Middleware wrapping every hop handler.
pub async fn track_request(State(role): State<HopRole>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let protocol = protocol_name(request.version());

    let response = next.run(request).await;

    record_request(role, protocol, response.status().as_u16(), start);
    response
}
