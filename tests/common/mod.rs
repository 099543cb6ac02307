//! Shared utilities for chain integration tests.

#![allow(dead_code)]

use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

use protocol_relay::hop::{Downstream, HopContext, HopRole, HopState};
use protocol_relay::net::{TlsMaterial, TransportSelector, TrustRoot};
use protocol_relay::{HopServer, Supervisor};

pub const MAX_BODY: usize = 1024 * 1024;

/// Self-signed certificate valid for `localhost` and `127.0.0.1`.
pub fn tls_material() -> TlsMaterial {
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let params =
        rcgen::CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()])
            .unwrap();
    let cert = params.self_signed(&key_pair).unwrap();
    TlsMaterial::from_pem(cert.pem().into_bytes(), key_pair.serialize_pem().into_bytes())
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Per-hop knobs for [`start_hop`].
pub struct HopSpec {
    pub role: HopRole,
    pub tls: bool,
    pub downstream: Option<(SocketAddr, bool)>,
    pub request_timeout: Duration,
}

impl HopSpec {
    pub fn new(role: HopRole, tls: bool, downstream: Option<(SocketAddr, bool)>) -> Self {
        Self {
            role,
            tls,
            downstream,
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Bind a hop on an ephemeral port and run it under `supervisor`.
pub async fn start_hop(
    supervisor: &mut Supervisor,
    material: &TlsMaterial,
    trust_root: &TrustRoot,
    spec: HopSpec,
) -> SocketAddr {
    let downstream = spec
        .downstream
        .map(|(addr, tls)| Downstream::new(&addr.to_string(), tls).unwrap());

    let state = HopState::new(HopContext {
        role: spec.role,
        downstream,
        transports: TransportSelector::new(trust_root.clone(), Duration::from_secs(2)),
        request_timeout: spec.request_timeout,
        max_body_bytes: MAX_BODY,
    });

    let tls = if spec.tls {
        Some(material.server_config().await.unwrap())
    } else {
        None
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    supervisor.spawn(HopServer::new(state, tls), listener).unwrap();
    addr
}

/// Addresses of a running chain. Dropping `supervisor` stops every hop.
pub struct TestChain {
    pub supervisor: Supervisor,
    pub origin: SocketAddr,
    pub relay: SocketAddr,
    pub edge: SocketAddr,
    pub presenter: SocketAddr,
}

/// Full chain: presenter (http) → edge (http) → relay (TLS) → origin (TLS).
pub async fn start_chain() -> TestChain {
    let material = tls_material();
    let trust_root = material.trust_root().unwrap();
    let mut supervisor = Supervisor::new();

    let origin = start_hop(
        &mut supervisor,
        &material,
        &trust_root,
        HopSpec::new(HopRole::Origin, true, None),
    )
    .await;
    let chain = start_chain_to(supervisor, &material, &trust_root, origin).await;
    wait_ready(chain.edge).await;
    chain
}

/// Relay, edge and presenter in front of an origin at `origin`.
pub async fn start_chain_to(
    mut supervisor: Supervisor,
    material: &TlsMaterial,
    trust_root: &TrustRoot,
    origin: SocketAddr,
) -> TestChain {
    let relay = start_hop(
        &mut supervisor,
        material,
        trust_root,
        HopSpec::new(HopRole::Relay, true, Some((origin, true))),
    )
    .await;
    let edge = start_hop(
        &mut supervisor,
        material,
        trust_root,
        HopSpec::new(HopRole::Edge, false, Some((relay, true))),
    )
    .await;
    let presenter = start_hop(
        &mut supervisor,
        material,
        trust_root,
        HopSpec::new(HopRole::Presenter, false, Some((edge, false))),
    )
    .await;

    TestChain {
        supervisor,
        origin,
        relay,
        edge,
        presenter,
    }
}

/// Serve an arbitrary router over TLS with `material`, for fake hops.
pub async fn serve_tls(router: Router, material: &TlsMaterial) -> SocketAddr {
    let config = material.server_config().await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let std_listener = listener.into_std().unwrap();

    tokio::spawn(async move {
        let _ = axum_server::from_tcp_rustls(std_listener, config)
            .serve(router.into_make_service())
            .await;
    });
    addr
}

/// Poll until a TCP connect to `addr` succeeds.
pub async fn wait_ready(addr: SocketAddr) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{} never became ready", addr);
}

/// GET the edge with the given flags and return status plus JSON body.
pub async fn query_edge(
    edge: SocketAddr,
    client_http2: bool,
    proxy_http2: bool,
) -> (reqwest::StatusCode, serde_json::Value) {
    let url = format!(
        "http://{}/?client-http2={}&proxy-http2={}",
        edge, client_http2, proxy_http2
    );
    let res = http_client().get(url).send().await.expect("Edge unreachable");
    let status = res.status();
    let body = res.json().await.expect("Edge body is not JSON");
    (status, body)
}
