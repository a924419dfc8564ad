//! Request body size limits.
//!
//! # Responsibilities
//! - Reject bodies whose declared `Content-Length` exceeds the limit
//! - Cap streamed bodies without a declared length
//! - Bound the multipart parser's buffering
//!
//! # Design Decisions
//! - Off unless `limits.max_body_size` is configured
//! - Declared lengths are checked before any byte is forwarded
//! - Streams that overrun the limit mid-flight abort the upstream call

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::header::CONTENT_LENGTH,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::LimitsConfig;
use crate::error::GatewayError;

/// Apply the configured body limit to `router`.
pub fn apply_body_limit(router: Router, limits: &LimitsConfig) -> Router {
    match limits.max_body_size {
        Some(max) => router
            .layer(DefaultBodyLimit::max(max))
            .layer(RequestBodyLimitLayer::new(max))
            .layer(middleware::from_fn_with_state(max, enforce_declared_length)),
        None => router.layer(DefaultBodyLimit::disable()),
    }
}

/// Reject a request up front when its declared length is over the limit.
pub async fn enforce_declared_length(
    State(max): State<usize>,
    request: Request,
    next: Next,
) -> Response {
    if declared_length(&request).is_some_and(|len| len > max as u64) {
        return GatewayError::PayloadTooLarge.into_response();
    }
    next.run(request).await
}

fn declared_length(request: &Request) -> Option<u64> {
    request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
    };
    use tower::ServiceExt;

    fn echo_router(limits: &LimitsConfig) -> Router {
        let router = Router::new().route(
            "/",
            post(|body: axum::body::Bytes| async move { body.len().to_string() }),
        );
        apply_body_limit(router, limits)
    }

    fn limited(max: usize) -> LimitsConfig {
        LimitsConfig {
            max_body_size: Some(max),
            ..LimitsConfig::default()
        }
    }

    #[tokio::test]
    async fn declared_oversize_is_rejected_with_json() {
        let response = echo_router(&limited(4))
            .oneshot(
                HttpRequest::post("/")
                    .header(CONTENT_LENGTH, "10")
                    .body(Body::from("0123456789"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[tokio::test]
    async fn body_within_limit_passes() {
        let response = echo_router(&limited(16))
            .oneshot(HttpRequest::post("/").body(Body::from("0123456789")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unlimited_when_not_configured() {
        let big = vec![b'x'; 4 * 1024 * 1024];
        let response = echo_router(&LimitsConfig::default())
            .oneshot(HttpRequest::post("/").body(Body::from(big)).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
