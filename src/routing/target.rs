//! Upstream URL resolution.
//!
//! # Responsibilities
//! - Strip the mount prefix from the inbound path
//! - Append the remainder and the raw query onto the base origin
//! - Enforce the optional path allow-list
//!
//! # Design Decisions
//! - The base origin is checked once at construction; a bad origin is still
//!   reported per request so the process keeps serving
//! - Path and query are appended as received, without re-encoding
//! - The allow-list is checked against the normalized URL path so dot
//!   segments cannot step outside an allowed prefix; the forwarded target
//!   itself keeps them

use axum::http::Uri;
use url::Url;

use crate::config::{LimitsConfig, UpstreamConfig};
use crate::error::GatewayError;
use crate::routing::matcher::PathAllowList;

/// Reported when no base origin is configured.
pub const ORIGIN_NOT_DEFINED: &str = "BACKEND_API_URL is not defined";

/// Reported when the configured base origin is not an absolute http(s) URL.
pub const ORIGIN_INVALID: &str = "BACKEND_API_URL is not a valid http(s) origin";

/// A usable base origin.
#[derive(Debug, Clone)]
struct Origin {
    /// Origin text with trailing slashes removed.
    text: String,
    /// Path component of the origin, without a trailing slash.
    base_path: String,
}

/// Derives outbound URLs from inbound request URIs.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    origin: Result<Origin, &'static str>,
    prefix: String,
    allow_list: PathAllowList,
}

impl TargetResolver {
    /// Build a resolver from the upstream and limits configuration.
    pub fn new(upstream: &UpstreamConfig, limits: &LimitsConfig) -> Self {
        Self {
            origin: parse_origin(upstream.base_origin.as_deref()),
            prefix: upstream.path_prefix.clone(),
            allow_list: PathAllowList::new(limits.allowed_paths.iter().cloned()),
        }
    }

    /// Mount prefix stripped from inbound paths.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Remove the mount prefix from the start of `path`.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.prefix.as_str()).unwrap_or(path)
    }

    /// Resolve the upstream URI for an inbound request URI.
    ///
    /// The result is the origin text, the stripped path and the query joined
    /// as-is; nothing is re-encoded or normalized on the way out.
    pub fn resolve(&self, uri: &Uri) -> Result<Uri, GatewayError> {
        let origin = self
            .origin
            .as_ref()
            .map_err(|message| GatewayError::Configuration((*message).to_string()))?;

        let mut target = format!("{}{}", origin.text, self.strip_prefix(uri.path()));
        if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }

        if !self.allow_list.is_unrestricted() {
            self.check_allowed(origin, &target)?;
        }

        Uri::try_from(target.as_str())
            .map_err(|e| GatewayError::Internal(format!("unusable target `{target}`: {e}")))
    }

    /// Allow-list check on the dot-segment-normalized path.
    fn check_allowed(&self, origin: &Origin, target: &str) -> Result<(), GatewayError> {
        let normalized = Url::parse(target).map_err(|_| GatewayError::PathNotAllowed)?;
        let forwarded = normalized
            .path()
            .strip_prefix(origin.base_path.as_str())
            .ok_or(GatewayError::PathNotAllowed)?;
        if self.allow_list.allows(forwarded) {
            Ok(())
        } else {
            Err(GatewayError::PathNotAllowed)
        }
    }
}

fn parse_origin(raw: Option<&str>) -> Result<Origin, &'static str> {
    let text = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ORIGIN_NOT_DEFINED)?
        .trim_end_matches('/');

    let parsed = Url::parse(text).map_err(|_| ORIGIN_INVALID)?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ORIGIN_INVALID);
    }
    Uri::try_from(text).map_err(|_| ORIGIN_INVALID)?;

    Ok(Origin {
        text: text.to_string(),
        base_path: parsed.path().trim_end_matches('/').to_string(),
    })
}
