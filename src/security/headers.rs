//! Header sanitizing for both legs of a forwarded exchange.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from requests and responses
//! - Drop `host`, `content-length` and `accept-encoding` on the way out
//! - Set the client origin in a single `X-Forwarded-For`
//!
//! # Design Decisions
//! - Every function is a value transformation `&HeaderMap -> HeaderMap`
//! - Headers nominated by a `Connection` field are treated as hop-by-hop too
//! - Multi-valued headers keep each field line; only the client origin is collapsed
//! - Content coding is negotiated by the transport, which only advertises what
//!   it can decode and removes `content-encoding` from bodies it has decoded

use axum::http::header::{CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Headers scoped to a single transport leg.
pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Removed from the outbound request in addition to [`HOP_BY_HOP`].
pub const REQUEST_ONLY_EXCLUDED: &[&str] = &["accept-encoding", "content-length", "host"];

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Build the outbound header set from the inbound one.
pub fn sanitize_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = filtered(inbound, REQUEST_ONLY_EXCLUDED);

    match client_origin(inbound) {
        Some(origin) => {
            outbound.insert(X_FORWARDED_FOR, origin);
        }
        None => {
            outbound.remove(X_FORWARDED_FOR);
        }
    }

    outbound
}

/// Build the client-facing header set from the upstream one.
pub fn sanitize_response_headers(upstream: &HeaderMap) -> HeaderMap {
    filtered(upstream, &[])
}

/// Copy of `headers` without `content-type`.
pub fn without_content_type(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    headers.remove(CONTENT_TYPE);
    headers
}

/// Client origin chain: existing `X-Forwarded-For`, else `X-Real-IP`.
///
/// Repeated field lines are combined with `", "`. Empty values count as absent.
pub fn client_origin(headers: &HeaderMap) -> Option<HeaderValue> {
    combined(headers, &X_FORWARDED_FOR).or_else(|| combined(headers, &X_REAL_IP))
}

fn combined(headers: &HeaderMap, name: &HeaderName) -> Option<HeaderValue> {
    let mut joined: Vec<u8> = Vec::new();
    for value in headers.get_all(name) {
        let value = value.as_bytes();
        if value.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        if !joined.is_empty() {
            joined.extend_from_slice(b", ");
        }
        joined.extend_from_slice(value);
    }

    if joined.is_empty() {
        return None;
    }
    HeaderValue::from_bytes(&joined).ok()
}

fn filtered(headers: &HeaderMap, extra: &[&str]) -> HeaderMap {
    let nominated = connection_tokens(headers);
    let mut out = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        let key = name.as_str();
        if HOP_BY_HOP.contains(&key)
            || extra.contains(&key)
            || nominated.iter().any(|token| token == key)
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    out
}

fn connection_tokens(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}
