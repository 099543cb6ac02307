//! Relay: tag with the inbound protocol, forward to the origin.
//!
//! # Responsibilities
//! - Observe the inbound protocol before touching the request
//! - Forward method, path, query and body to the origin over the transport
//!   chosen by `proxy-http2`
//! - Reply `<tag><SENTINEL><origin body>` with the origin's status
//!
//! # Design Decisions
//! - The origin response is buffered; nothing is written to the caller until
//!   the origin has answered, so failures never leave a half-tagged body
//! - Origin failure statuses are passed through unchanged

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
};

use crate::error::ChainResult;
use crate::hop::HopState;
use crate::http::headers::forward_headers;
use crate::http::request::{forwarded_path, inbound_host, request_id, NegotiationFlags};
use crate::net::transport::collect;
use crate::protocol::{encode_relay_body, ProtocolObservation};
use crate::resilience::Deadline;

pub async fn handle(
    State(state): State<HopState>,
    request: Request<Body>,
) -> ChainResult<Response<Body>> {
    let tag = ProtocolObservation::observe(request.version());
    let flags = NegotiationFlags::from_uri(request.uri());
    let deadline = Deadline::from_headers(request.headers(), state.request_timeout());
    let request_id = request_id(request.headers());

    let downstream = state.downstream()?;
    let uri = downstream.uri_for(forwarded_path(request.uri()))?;
    let host = inbound_host(&request);

    let (parts, body) = request.into_parts();
    let headers = forward_headers(&parts.headers, host.as_deref(), downstream.authority(), &deadline);

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = headers;

    let transport = state.transports().select(flags.relay_uses_http2)?;

    tracing::debug!(
        request_id = %request_id,
        inbound = %tag.request_protocol,
        outbound = %transport.kind(),
        downstream = %downstream,
        "Relaying request"
    );

    let limit = state.max_body_bytes();
    let result = deadline
        .run(async {
            let response = transport.issue(outbound).await?;
            collect(response, limit).await
        })
        .await;

    let (origin, origin_body) = match result {
        Ok(ok) => ok,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Origin request failed");
            return Err(e);
        }
    };

    if !origin.status.is_success() {
        tracing::warn!(
            request_id = %request_id,
            status = %origin.status,
            "Origin returned failure status"
        );
    }

    let framed = encode_relay_body(&tag, &origin_body)?;

    let mut response = Response::new(Body::from(framed));
    *response.status_mut() = origin.status;
    Ok(response)
}
