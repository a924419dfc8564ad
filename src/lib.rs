//! Single-upstream HTTP forwarding gateway.
//!
//! Relays every request under a path prefix to one configured base origin,
//! streaming bodies both ways, sanitizing transport-scoped headers, and
//! turning failures into a small JSON error contract.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
