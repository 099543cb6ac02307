//! Edge: call the relay and decompose its tagged body.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    Json,
};

use crate::error::{ChainError, ChainResult};
use crate::hop::HopState;
use crate::http::headers::outbound_headers;
use crate::http::request::{forwarded_path, request_id, NegotiationFlags};
use crate::http::response::describe_body;
use crate::net::transport::collect;
use crate::protocol::{decode_relay_body, protocol_name, AggregatedResponse};
use crate::resilience::Deadline;

pub async fn handle(
    State(state): State<HopState>,
    request: Request<Body>,
) -> ChainResult<Json<AggregatedResponse>> {
    let flags = NegotiationFlags::from_uri(request.uri());
    let deadline = Deadline::from_headers(request.headers(), state.request_timeout());
    let request_id = request_id(request.headers());

    match aggregate(&state, flags, forwarded_path(request.uri()), &request_id, &deadline).await {
        Ok(aggregated) => {
            tracing::info!(
                request_id = %request_id,
                code = %aggregated.response_code,
                protocol = %aggregated.response_protocol,
                relay = %aggregated.relay_observation.request_protocol,
                origin = %aggregated.origin_observation.request_protocol,
                "Chain aggregated"
            );
            Ok(Json(aggregated))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Chain aggregation failed");
            Err(e)
        }
    }
}

/// One call to the relay, decoded into the combined view.
///
/// `path_and_query` is reused verbatim so the relay sees the same flags.
pub async fn aggregate(
    state: &HopState,
    flags: NegotiationFlags,
    path_and_query: &str,
    request_id: &str,
    deadline: &Deadline,
) -> ChainResult<AggregatedResponse> {
    let downstream = state.downstream()?;
    let uri = downstream.uri_for(path_and_query)?;
    let transport = state.transports().select(flags.edge_uses_http2)?;

    let mut outbound = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .map_err(|e| ChainError::Configuration(format!("Cannot build relay request: {}", e)))?;
    *outbound.headers_mut() = outbound_headers(request_id, deadline);

    let limit = state.max_body_bytes();
    let (parts, body) = deadline
        .run(async {
            let response = transport.issue(outbound).await?;
            collect(response, limit).await
        })
        .await?;

    if !parts.status.is_success() {
        return Err(ChainError::Upstream {
            status: parts.status,
            detail: describe_body(&body),
        });
    }

    let (relay_observation, origin_observation) = decode_relay_body(&body)?;

    Ok(AggregatedResponse {
        response_code: parts.status.as_u16().to_string(),
        response_protocol: protocol_name(parts.version).to_string(),
        relay_observation,
        origin_observation,
    })
}
