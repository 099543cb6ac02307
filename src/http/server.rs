//! HTTP server setup for one hop.
//!
//! # Responsibilities
//! - Create the Axum Router for the hop's role
//! - Serve HTTP/1.1 and HTTP/2 (ALPN) on TLS hops, HTTP/1.1 on plain hops
//! - Wire up middleware (tracing, body limit, request ID, metrics)
//! - Stop gracefully when the shutdown signal fires

use axum::{
    middleware,
    routing::{any, get, MethodRouter},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::hop::{edge, origin, presenter, relay, HopRole, HopState};
use crate::http::request::MakeChainRequestId;
use crate::observability::metrics;

/// Time in-flight requests get to finish once shutdown starts.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP server for one hop of the chain.
pub struct HopServer {
    role: HopRole,
    router: Router,
    tls: Option<RustlsConfig>,
}

impl HopServer {
    /// Create a server for `state.role()`; `tls` enables HTTPS.
    pub fn new(state: HopState, tls: Option<RustlsConfig>) -> Self {
        let role = state.role();
        let router = Self::build_router(state);
        Self { role, router, tls }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: HopState) -> Router {
        let role = state.role();
        let max_body = state.max_body_bytes();

        let handler: MethodRouter<HopState> = match role {
            HopRole::Origin => any(origin::handle),
            HopRole::Relay => any(relay::handle),
            HopRole::Edge => any(edge::handle),
            HopRole::Presenter => get(presenter::handle),
        };

        Router::new()
            .route("/", handler.clone())
            .route("/{*path}", handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(role, metrics::track_request))
            .layer(RequestBodyLimitLayer::new(max_body))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeChainRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    pub fn role(&self) -> HopRole {
        self.role
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let scheme = if self.tls.is_some() { "https" } else { "http" };
        tracing::info!(role = %self.role, "Starting {} on {}://{}", self.role, scheme, addr);

        let app = self.router.into_make_service();

        match self.tls {
            None => {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                    })
                    .await?;
            }
            Some(config) => {
                let handle = axum_server::Handle::new();
                let signal = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    signal.graceful_shutdown(Some(DRAIN_TIMEOUT));
                });

                axum_server::from_tcp_rustls(listener.into_std()?, config)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
        }

        tracing::info!(role = %self.role, "Server stopped");
        Ok(())
    }
}
