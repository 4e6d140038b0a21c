//! Request routing module
//!
//! Route values and the table that resolves request URLs to them.

pub mod route;
pub mod table;

pub use route::{HandlerFn, HandlerFuture, MethodEntry, RequestContext, Route, RouteKind};
pub use table::{normalize_url, RouteTable};
