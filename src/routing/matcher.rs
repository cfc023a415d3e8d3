//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request path against a literal prefix (case-sensitive)
//! - Strip that prefix for forwarding
//!
//! # Design Decisions
//! - Plain `starts_with`: `/apiary` matches `/api` the same way it would with
//!   any string-prefix router
//! - No regex, no normalisation of the path before matching

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request path prefix.
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

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` begins with the prefix.
    pub fn matches_path(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Remove the prefix from `path` once, if present.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}
