//! statica - minimalist static-content HTTP server library.
//!
//! The core is a request dispatcher that resolves an inbound URL against a
//! [`routing::RouteTable`] (exact routes, per-method tables, regex patterns)
//! and either invokes the matched handler behind a per-request fault
//! boundary or serves a file from the configured root with conditional-GET
//! caching (`ETag` / `If-Modified-Since`).

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use routing::{Route, RouteTable};
pub use server::Server;
