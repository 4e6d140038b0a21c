//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the dispatcher and the file
//! server: MIME detection, cache validators and response composition.

pub mod caching;
pub mod mime;
pub mod response;

pub use response::ResponseWriter;
