//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (declared length, streamed length, multipart buffering)
//!     → headers.rs (strip hop-by-hop, set X-Forwarded-For)
//!     → Pass to forwarder
//!
//! Upstream response:
//!     → headers.rs (strip framing headers)
//!     → Pass to client
//! ```
//!
//! # Design Decisions
//! - Header hygiene is pure: inbound maps are never mutated in place
//! - Limits are opt-in; the gateway trusts its callers by default

pub mod headers;
pub mod limits;
