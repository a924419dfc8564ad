//! HTTP server setup and the forwarding handler.
//!
//! # Responsibilities
//! - Create Axum Router mounting the gateway under its prefix
//! - Wire up middleware (tracing, request ID, body limits)
//! - Run the forwarding pipeline for each request
//! - Map every failure onto the JSON error contract
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::{error_response, GatewayError};
use crate::http::body::adapt_body;
use crate::http::client::{Forwarder, OutboundRequest, Transport};
use crate::http::request::{
    is_client_request_id, mark_client_request_id, propagate_request_id_layer, request_id,
    set_request_id_layer, X_REQUEST_ID,
};
use crate::http::response::into_client_response;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::TargetResolver;
use crate::security::headers::sanitize_request_headers;
use crate::security::limits::apply_body_limit;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TargetResolver>,
    pub transport: Arc<dyn Transport>,
}

/// HTTP server for the forwarding gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server that forwards through a [`Forwarder`].
    pub fn new(config: GatewayConfig) -> Result<Self, native_tls::Error> {
        let forwarder = Forwarder::new(&config.timeouts)?;
        Ok(Self::with_transport(config, Arc::new(forwarder)))
    }

    /// Create a server with a caller-supplied transport.
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        let state = AppState {
            resolver: Arc::new(TargetResolver::new(&config.upstream, &config.limits)),
            transport,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = mount_routes(Router::new(), state.resolver.prefix())
            .fallback(not_found)
            .with_state(state);

        apply_body_limit(router, &config.limits)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
            .layer(middleware::from_fn(mark_client_request_id))
    }

    /// Router with every layer applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.upstream.path_prefix,
            "HTTP server starting"
        );
        if self.config.upstream.base_origin.is_none() {
            tracing::warn!("No base origin configured; requests will fail until it is set");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait_for(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Routes covering `prefix`, `prefix/` and everything beneath it.
fn mount_routes(router: Router<AppState>, prefix: &str) -> Router<AppState> {
    if prefix.is_empty() {
        return router
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler));
    }

    router
        .route(prefix, any(forward_handler))
        .route(&format!("{prefix}/"), any(forward_handler))
        .route(&format!("{prefix}/{{*path}}"), any(forward_handler))
}

/// Main gateway handler.
async fn forward_handler(State(state): State<AppState>, request: Request) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            metrics::record_failure(err.kind());
            err.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

/// Resolve, sanitize, adapt, and send one request upstream.
pub async fn forward(state: &AppState, request: Request) -> Result<Response, GatewayError> {
    let uri = state.resolver.resolve(request.uri())?;
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    let mut headers = sanitize_request_headers(request.headers());
    if !is_client_request_id(&request) {
        headers.remove(X_REQUEST_ID);
    }
    let (body, headers) = adapt_body(request, headers).await?;

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %uri,
        "Forwarding request"
    );

    let upstream = state
        .transport
        .send(OutboundRequest {
            method,
            uri,
            headers,
            body,
        })
        .await?;

    tracing::debug!(
        request_id = %request_id,
        status = %upstream.status,
        "Upstream responded"
    );

    Ok(into_client_response(upstream))
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
