//! Presenter: HTML view of one pass through the chain.
//!
//! Calls the edge with the caller's query string untouched and renders either
//! the aggregated protocols or an "unavailable" panel. It never fills in
//! protocol values it did not receive.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::error::{ChainError, ChainResult};
use crate::hop::HopState;
use crate::http::headers::outbound_headers;
use crate::http::request::{
    forwarded_path, request_id, NegotiationFlags, CLIENT_HTTP2_PARAM, PROXY_HTTP2_PARAM,
};
use crate::http::response::describe_body;
use crate::net::transport::collect;
use crate::protocol::AggregatedResponse;
use crate::resilience::Deadline;

pub async fn handle(State(state): State<HopState>, request: Request<Body>) -> Response {
    let flags = NegotiationFlags::from_uri(request.uri());
    let deadline = Deadline::from_headers(request.headers(), state.request_timeout());
    let request_id = request_id(request.headers());

    match fetch(&state, forwarded_path(request.uri()), &request_id, &deadline).await {
        Ok(aggregated) => Html(render(flags, Ok(&aggregated))).into_response(),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Edge unavailable");
            (e.status(), Html(render(flags, Err(&e)))).into_response()
        }
    }
}

async fn fetch(
    state: &HopState,
    path_and_query: &str,
    request_id: &str,
    deadline: &Deadline,
) -> ChainResult<AggregatedResponse> {
    let uri = state.downstream()?.uri_for(path_and_query)?;
    let transport = state.transports().select(false)?;

    let mut outbound = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .map_err(|e| ChainError::Configuration(format!("Cannot build edge request: {}", e)))?;
    *outbound.headers_mut() = outbound_headers(request_id, deadline);

    let limit = state.max_body_bytes();
    let (parts, body) = deadline
        .run(async {
            let response = transport.issue(outbound).await?;
            collect(response, limit).await
        })
        .await?;

    if parts.status != StatusCode::OK {
        return Err(ChainError::Upstream {
            status: parts.status,
            detail: describe_body(&body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| ChainError::Upstream {
        status: StatusCode::BAD_GATEWAY,
        detail: format!("Edge returned malformed JSON: {}", e),
    })
}

fn render(flags: NegotiationFlags, result: Result<&AggregatedResponse, &ChainError>) -> String {
    let panel = match result {
        Ok(aggregated) => format!(
            r#"<table>
  <tr><th>Hop</th><th>Protocol</th></tr>
  <tr><td>edge &rarr; relay response</td><td>{code} {protocol}</td></tr>
  <tr><td>relay observed</td><td>{relay}</td></tr>
  <tr><td>origin observed</td><td>{origin}</td></tr>
</table>"#,
            code = escape(&aggregated.response_code),
            protocol = escape(&aggregated.response_protocol),
            relay = escape(&aggregated.relay_observation.request_protocol),
            origin = escape(&aggregated.origin_observation.request_protocol),
        ),
        Err(e) => format!(
            r#"<div class="unavailable"><h2>unavailable</h2><p>{}</p></div>"#,
            escape(&e.to_string())
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>protocol relay</title></head>
<body>
<h1>Negotiated protocols</h1>
<form method="get" action="/">
  <label><input type="checkbox" name="{client}" value="true"{client_checked}> edge uses HTTP/2</label>
  <label><input type="checkbox" name="{proxy}" value="true"{proxy_checked}> relay uses HTTP/2</label>
  <button type="submit">Send</button>
</form>
{panel}
</body>
</html>
"#,
        client = CLIENT_HTTP2_PARAM,
        proxy = PROXY_HTTP2_PARAM,
        client_checked = checked(flags.edge_uses_http2),
        proxy_checked = checked(flags.relay_uses_http2),
        panel = panel,
    )
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
