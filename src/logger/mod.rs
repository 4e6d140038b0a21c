//! Logger module
//!
//! Server lifecycle, warning/error and access logging. Access logs go to
//! stdout, errors to stderr.

mod format;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use std::net::SocketAddr;

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Static server started successfully");
    println!("Listening on: http://{addr}");
    println!("Site root: {}", config.site.root);
    println!("Cache max-age: {}s", config.site.cache_max_age);
    println!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        println!("[Headers] Count: {count}");
    }
}

/// Default observability sink for handler faults
pub fn log_handler_fault(path: &str, detail: &str) {
    eprintln!("[ERROR] Handler fault at {path}: {detail}");
}

/// Write a formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    println!("{}", entry.format(format));
}
