//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Look up the protected route for a request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) linear scan (tables rarely exceed tens of entries)
//! - First declared match wins

use crate::config::RouteConfig;
use crate::routing::matcher::{request_path, Route};

/// Ordered table of protected routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Compile the table from configuration, keeping declaration order.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        Self::new(routes.iter().map(Route::from).collect())
    }

    /// Find the route protecting `(method, uri)`, if any.
    pub fn match_route(&self, method: &str, uri: &str) -> Option<&Route> {
        let path = request_path(uri);
        self.routes.iter().find(|route| route.matches(method, path))
    }
}
