//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn the upstream response into the client response
//! - Strip headers that conflict with the gateway's own framing
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Status codes pass through untouched, 3xx and `Location` included
//! - Non-2xx upstream statuses are responses, not errors

use axum::response::Response;

use crate::http::client::UpstreamResponse;
use crate::security::headers::sanitize_response_headers;

/// Build the client-facing response from an upstream one.
pub fn into_client_response(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(upstream.body);
    *response.status_mut() = upstream.status;
    *response.headers_mut() = sanitize_response_headers(&upstream.headers);
    response
}
