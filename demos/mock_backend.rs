//! Local upstream for trying the gateway by hand.
//!
//! ```text
//! cargo run --example mock_backend
//! BACKEND_API_URL=http://127.0.0.1:8081 cargo run
//! curl -i localhost:8080/api/proxy/echo?hello=world
//! ```

use std::net::SocketAddr;

use axum::{
    extract::Request,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde_json::json;

async fn echo(request: Request) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, 1024 * 1024)
        .await
        .unwrap_or_default();

    let headers: serde_json::Map<String, serde_json::Value> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into(),
            )
        })
        .collect();

    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/status", get(|| async { "ok" }))
        .route(
            "/moved",
            get(|| async { (StatusCode::FOUND, [(LOCATION, "/status")]) }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route("/", any(echo))
        .route("/{*path}", any(echo));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("mock upstream listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
