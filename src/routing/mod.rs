//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → target.rs (strip prefix, join onto base origin)
//!     → matcher.rs (optional allow-list check)
//!     → Return: upstream URL or GatewayError
//! ```
//!
//! # Design Decisions
//! - Resolver built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always resolves to the same URL

pub mod matcher;
pub mod target;

pub use matcher::{PathAllowList, PathPrefixMatcher};
pub use target::TargetResolver;
