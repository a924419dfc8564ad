//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (Axum setup, middleware, handler)
//!     → request.rs (request ID)
//!     → routing::target (upstream URL)
//!     → security::headers (outbound header set)
//!     → body.rs (outbound body representation)
//!     → client.rs (single upstream call, no redirects)
//!     → response.rs (client-facing headers, streamed body)
//!     → Send to client
//! ```

pub mod body;
pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use body::OutboundBody;
pub use client::{Forwarder, OutboundRequest, Transport, UpstreamResponse};
pub use request::X_REQUEST_ID;
pub use server::{AppState, GatewayServer};
