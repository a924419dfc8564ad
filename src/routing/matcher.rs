//! Upstream path matching.
//!
//! # Responsibilities
//! - Match a forwarded path against a configured prefix
//! - Combine prefixes into an allow-list with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefixes match whole segments: `/users` admits `/users/5`, not `/usersadmin`
//! - Empty allow-list = always matches (wildcard)
//! - No regex to guarantee O(n) matching

/// Matches the forwarded path against a segment-aligned prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns true if `path` is the prefix itself or lies beneath it.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}

/// Set of upstream paths the gateway may reach.
#[derive(Debug, Clone, Default)]
pub struct PathAllowList {
    matchers: Vec<PathPrefixMatcher>,
}

impl PathAllowList {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            matchers: prefixes.into_iter().map(PathPrefixMatcher::new).collect(),
        }
    }

    /// True when no restriction is configured.
    pub fn is_unrestricted(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Returns true if any configured prefix admits `path`.
    pub fn allows(&self, path: &str) -> bool {
        self.is_unrestricted() || self.matchers.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/users");

        assert!(matcher.matches("/users"));
        assert!(matcher.matches("/users/5"));
        assert!(!matcher.matches("/usersadmin"));
        assert!(!matcher.matches("/workouts"));
        assert!(!matcher.matches("/Users")); // Case sensitive
    }

    #[test]
    fn test_trailing_slash_prefix() {
        let matcher = PathPrefixMatcher::new("/static/");
        assert!(matcher.matches("/static/app.js"));
        assert!(!matcher.matches("/static"));
    }

    #[test]
    fn test_empty_allow_list_admits_everything() {
        let list = PathAllowList::default();
        assert!(list.is_unrestricted());
        assert!(list.allows("/anything/at/all"));
    }

    #[test]
    fn test_allow_list_or_semantics() {
        let list = PathAllowList::new(["/users", "/workouts"]);
        assert!(list.allows("/users/1"));
        assert!(list.allows("/workouts"));
        assert!(!list.allows("/admin"));
    }
}
