//! Sentinel framing of the relay's tagged body.
//!
//! The relay writes `<tag JSON><SENTINEL><forwarded body>`. The edge splits
//! on the sentinel and requires exactly two segments. A forwarded body that
//! itself contains the sentinel is therefore rejected at the edge instead of
//! being mis-split.

use thiserror::Error;

use crate::protocol::observation::ProtocolObservation;

/// Marker separating the relay's own tag from the forwarded body.
pub const SENTINEL: &[u8] = b"~~boundary~~";

/// Which half of the relay body failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Relay,
    Origin,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Relay => write!(f, "relay"),
            Segment::Origin => write!(f, "origin"),
        }
    }
}

/// Framing violations of the relay body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("sentinel delimiter not found in relay body")]
    MissingSentinel,

    #[error("sentinel delimiter found {0} times in relay body, expected exactly once")]
    RepeatedSentinel(usize),

    #[error("{segment} segment is not a protocol observation: {source}")]
    MalformedSegment {
        segment: Segment,
        #[source]
        source: serde_json::Error,
    },

    #[error("relay tag contains the sentinel delimiter")]
    SentinelInTag,
}

/// Build the relay body from its own observation and the origin's raw body.
pub fn encode_relay_body(
    tag: &ProtocolObservation,
    forwarded: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let tag_json = serde_json::to_vec(tag).map_err(|source| DecodeError::MalformedSegment {
        segment: Segment::Relay,
        source,
    })?;

    if find(&tag_json, SENTINEL).is_some() {
        return Err(DecodeError::SentinelInTag);
    }

    let mut body = Vec::with_capacity(tag_json.len() + SENTINEL.len() + forwarded.len());
    body.extend_from_slice(&tag_json);
    body.extend_from_slice(SENTINEL);
    body.extend_from_slice(forwarded);
    Ok(body)
}

/// Split a relay body into the relay's and the origin's observations.
pub fn decode_relay_body(
    body: &[u8],
) -> Result<(ProtocolObservation, ProtocolObservation), DecodeError> {
    let segments = split(body, SENTINEL);
    match segments.len() {
        1 => return Err(DecodeError::MissingSentinel),
        2 => {}
        n => return Err(DecodeError::RepeatedSentinel(n - 1)),
    }

    let relay = parse_segment(segments[0], Segment::Relay)?;
    let origin = parse_segment(segments[1], Segment::Origin)?;
    Ok((relay, origin))
}

fn parse_segment(bytes: &[u8], segment: Segment) -> Result<ProtocolObservation, DecodeError> {
    serde_json::from_slice(bytes).map_err(|source| DecodeError::MalformedSegment { segment, source })
}

/// Non-overlapping split, left to right.
fn split<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut segments = Vec::new();
    let mut rest = haystack;
    while let Some(idx) = find(rest, needle) {
        segments.push(&rest[..idx]);
        rest = &rest[idx + needle.len()..];
    }
    segments.push(rest);
    segments
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Version;

    #[test]
    fn relay_body_splits_into_both_observations() {
        let relay = ProtocolObservation::observe(Version::HTTP_2);
        let origin = serde_json::to_vec(&ProtocolObservation::observe(Version::HTTP_11)).unwrap();

        let body = encode_relay_body(&relay, &origin).unwrap();
        let (decoded_relay, decoded_origin) = decode_relay_body(&body).unwrap();

        assert_eq!(decoded_relay.request_protocol, "HTTP/2.0");
        assert_eq!(decoded_origin.request_protocol, "HTTP/1.1");
    }

    #[test]
    fn missing_sentinel_is_rejected() {
        let err = decode_relay_body(br#"{"protocol":"HTTP/1.1"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingSentinel));
    }

    #[test]
    fn repeated_sentinel_is_rejected() {
        let body = br#"{"protocol":"HTTP/1.1"}~~boundary~~{"protocol":"HTTP/1.1"}~~boundary~~"#;
        let err = decode_relay_body(body).unwrap_err();
        assert!(matches!(err, DecodeError::RepeatedSentinel(2)));
    }

    #[test]
    fn malformed_origin_segment_names_the_segment() {
        let body = br#"{"protocol":"HTTP/1.1"}~~boundary~~<html>502</html>"#;
        match decode_relay_body(body).unwrap_err() {
            DecodeError::MalformedSegment { segment, .. } => assert_eq!(segment, Segment::Origin),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_relay_segment_is_rejected() {
        let body = br#"~~boundary~~{"protocol":"HTTP/1.1"}"#;
        match decode_relay_body(body).unwrap_err() {
            DecodeError::MalformedSegment { segment, .. } => assert_eq!(segment, Segment::Relay),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tag_carrying_sentinel_is_refused() {
        let tag = ProtocolObservation {
            request_protocol: "HTTP/~~boundary~~".into(),
        };
        let err = encode_relay_body(&tag, b"").unwrap_err();
        assert!(matches!(err, DecodeError::SentinelInTag));
    }

    #[test]
    fn split_does_not_overlap_matches() {
        let parts = split(b"a~~boundary~~boundary~~b", SENTINEL);
        assert_eq!(parts, vec![&b"a"[..], &b"boundary~~b"[..]]);
    }
}
