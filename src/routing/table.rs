//! Route table module
//!
//! Owns the registered routes: an exact-URL map plus an ordered list of
//! pattern routes. Lookup normalizes the URL, tries the exact map, then
//! scans patterns in registration order.

use std::collections::HashMap;

use super::route::Route;

/// Strip exactly one trailing `/` unless the URL is the root `/`
///
/// Idempotent for URLs with at most one trailing slash, which is what
/// registration and request paths produce.
pub fn normalize_url(url: &str) -> &str {
    if url.len() > 1 && url.ends_with('/') {
        &url[..url.len() - 1]
    } else {
        url
    }
}

/// The set of registered routes
#[derive(Debug, Default)]
pub struct RouteTable {
    /// Normalized literal URL -> route; last registration wins
    exact: HashMap<String, Route>,
    /// Pattern routes in registration order; first match wins
    patterns: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route under a URL
    ///
    /// Pattern-bearing routes are appended to the ordered pattern list
    /// (re-registration is additive); literal routes are keyed by the
    /// normalized URL and replace any prior entry.
    pub fn register(&mut self, url: &str, route: Route) {
        if route.pattern.is_some() {
            self.patterns.push(route);
        } else {
            self.exact.insert(normalize_url(url).to_string(), route);
        }
    }

    /// Drop all registered routes
    pub fn clear(&mut self) {
        self.exact.clear();
        self.patterns.clear();
    }

    /// Resolve a URL to a route
    ///
    /// Normalizes, tries the exact map, then scans patterns in
    /// registration order. Returns `None` when nothing matches.
    pub fn lookup(&self, url: &str) -> Option<&Route> {
        let url = normalize_url(url);
        if let Some(route) = self.exact.get(url) {
            return Some(route);
        }
        self.patterns.iter().find(|route| route.matches(url))
    }

    /// Whether a URL resolves to any registered route
    pub fn exists(&self, url: &str) -> bool {
        self.lookup(url).is_some()
    }
}
