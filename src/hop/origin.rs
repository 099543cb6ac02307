//! Origin: the leaf of the chain.

use axum::{body::Body, http::Request, Json};

use crate::protocol::ProtocolObservation;

/// Report the protocol of the inbound connection and nothing else.
pub async fn handle(request: Request<Body>) -> Json<ProtocolObservation> {
    let observation = ProtocolObservation::observe(request.version());
    tracing::debug!(protocol = %observation.request_protocol, "Origin observed request");
    Json(observation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Version;

    #[tokio::test]
    async fn reports_inbound_version() {
        let request = Request::builder()
            .version(Version::HTTP_2)
            .body(Body::empty())
            .unwrap();

        let Json(observation) = handle(request).await;
        assert_eq!(observation.request_protocol, "HTTP/2.0");
    }
}
