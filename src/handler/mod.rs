//! Request handling module
//!
//! Dispatch, file serving, request-body accumulation and the per-request
//! fault boundary.

pub mod body;
pub mod dispatcher;
pub mod fault;
pub mod file_server;

pub use body::RequestBody;
pub use dispatcher::{error_response, serve_route};
pub use file_server::{serve_file, FileError};
