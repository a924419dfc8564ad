//! Gateway error taxonomy and its mapping onto HTTP responses.
//!
//! Every failure a request can hit ends up here and leaves the gateway as a
//! JSON envelope `{"error": "<message>"}`; nothing propagates to the client
//! as a reset connection. Non-2xx upstream statuses are not errors and never
//! reach this module.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message returned for every transport-level failure.
pub const UPSTREAM_FAILED: &str = "Upstream request failed";

/// Failures produced while forwarding a single request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The base origin is missing or unusable.
    #[error("{0}")]
    Configuration(String),

    /// The upstream could not be reached (refused, DNS, TLS, reset).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[source] hyper_util::client::legacy::Error),

    /// No response headers arrived within the configured time.
    #[error("upstream sent no response within {0:?}")]
    UpstreamTimeout(Duration),

    /// The stripped path is outside the configured allow-list.
    #[error("Path not allowed")]
    PathNotAllowed,

    /// The inbound body exceeded the configured maximum size.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Anything else; mapped conservatively to 502.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// Status code the error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::PathNotAllowed => StatusCode::FORBIDDEN,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::UpstreamUnavailable(_)
            | GatewayError::UpstreamTimeout(_)
            | GatewayError::Internal(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-facing message. Transport details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::UpstreamUnavailable(_)
            | GatewayError::UpstreamTimeout(_)
            | GatewayError::Internal(_) => UPSTREAM_FAILED.to_string(),
            other => other.to_string(),
        }
    }

    /// Short label used for the failure metric.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration",
            GatewayError::UpstreamUnavailable(_) => "upstream_unavailable",
            GatewayError::UpstreamTimeout(_) => "upstream_timeout",
            GatewayError::PathNotAllowed => "path_not_allowed",
            GatewayError::PayloadTooLarge => "payload_too_large",
            GatewayError::Internal(_) => "internal",
        }
    }
}

/// JSON body of every gateway-generated error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Build the `{"error": ...}` response for a status and message.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            tracing::warn!(kind = self.kind(), error = %self, "Request rejected");
        }
        error_response(status, self.public_message())
    }
}
