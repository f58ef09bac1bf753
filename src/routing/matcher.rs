//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (exact, case-sensitive per HTTP)
//! - Match request path (exact, query string excluded)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Exact string equality only: no wildcards, prefixes or regex
//! - Methods are compared as written; HTTP methods are case-sensitive

use crate::config::RouteConfig;

/// A compiled protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: String,
    pub path: String,
    pub event: String,
}

impl Route {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            event: event.into(),
        }
    }

    /// Returns true if both method and path match exactly.
    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

impl From<&RouteConfig> for Route {
    fn from(config: &RouteConfig) -> Self {
        Self::new(&config.method, &config.path, &config.event)
    }
}

/// Strip the query string and fragment from a request URI.
///
/// Accepts either a bare path (`/signup?x=1`) or an absolute URI.
pub fn request_path(uri: &str) -> &str {
    let path = match uri.find("://") {
        Some(scheme_end) => {
            let rest = &uri[scheme_end + 3..];
            rest.find('/').map_or("/", |i| &rest[i..])
        }
        None => uri,
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
