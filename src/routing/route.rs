//! Route value module
//!
//! A [`Route`] is an immutable description of how one URL resolves:
//! a file under the site root, an arbitrary handler, or a per-method
//! table. A route optionally carries a compiled regex pattern; pattern
//! routes are matched against the request path instead of being stored
//! under a literal key. The shape is resolved once at registration time,
//! never re-inspected per request.

use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Method, Response};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::handler::body::RequestBody;
use http_body_util::Full;

/// Per-request context handed to handler routes
///
/// Created per request and dropped when the response completes. The body
/// is fully accumulated before the handler runs; `body.error` is the
/// terminal error flag.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Future returned by a handler invocation
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response<Full<Bytes>>> + Send>>;

/// A user-supplied request handler
pub type HandlerFn = Arc<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>;

/// Entry in a per-method dispatch table
#[derive(Clone)]
pub enum MethodEntry {
    /// Serve this file (relative to the site root)
    File(String),
    /// Invoke this handler
    Handler(HandlerFn),
}

impl MethodEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    pub fn handler<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        Self::Handler(wrap_handler(f))
    }
}

/// How a matched URL is resolved
#[derive(Clone)]
pub enum RouteKind {
    /// Serve this file (relative to the site root)
    FilePath(String),
    /// Invoke this handler for all methods
    Handler(HandlerFn),
    /// Per-method dispatch; an unmatched method is a 404
    MethodTable(HashMap<Method, MethodEntry>),
}

/// An immutable registered route
#[derive(Clone)]
pub struct Route {
    pub kind: RouteKind,
    /// Present on pattern routes; mutually exclusive with exact-key storage
    pub pattern: Option<Regex>,
}

impl Route {
    /// Route serving a single file
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::FilePath(path.into()),
            pattern: None,
        }
    }

    /// Route invoking a handler for every method
    pub fn handler<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response<Full<Bytes>>> + Send + 'static,
    {
        Self {
            kind: RouteKind::Handler(wrap_handler(f)),
            pattern: None,
        }
    }

    /// Route dispatching per HTTP method
    pub fn methods(entries: impl IntoIterator<Item = (Method, MethodEntry)>) -> Self {
        Self {
            kind: RouteKind::MethodTable(entries.into_iter().collect()),
            pattern: None,
        }
    }

    /// Attach a compiled pattern, turning this into a pattern route
    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Whether the pattern matches the (normalized) URL
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(url))
    }
}

fn wrap_handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<Full<Bytes>>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            RouteKind::FilePath(path) => format!("FilePath({path})"),
            RouteKind::Handler(_) => "Handler".to_string(),
            RouteKind::MethodTable(table) => format!("MethodTable({} methods)", table.len()),
        };
        f.debug_struct("Route")
            .field("kind", &kind)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .finish()
    }
}
