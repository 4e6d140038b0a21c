// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Site configuration: where files come from and how long clients cache them
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Root directory files are served from
    pub root: String,
    /// Client cache max-age in seconds (`Cache-Control: max-age=<n>`)
    pub cache_max_age: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Routes configuration
///
/// Literal and pattern routes loaded from the config file. Handler routes
/// cannot be expressed in configuration; they are registered on the
/// [`crate::Server`] programmatically.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutesConfig {
    /// Literal URL -> route (exact match after normalization)
    #[serde(default)]
    pub custom: HashMap<String, RouteConfig>,
    /// Regex routes, evaluated in order after exact lookup fails
    #[serde(default)]
    pub patterns: Vec<PatternRouteConfig>,
    /// Status code -> error page file path, consulted by the error responder
    #[serde(default)]
    pub error_pages: HashMap<u16, String>,
}

/// Route definition in the config file
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteConfig {
    /// Serve this file (relative to the site root)
    File { path: String },
    /// 301 redirect to the target URL
    Redirect { target: String },
}

/// Pattern route definition in the config file
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PatternRouteConfig {
    /// Regex source matched against the normalized request path
    pub pattern: String,
    /// File served when the pattern matches
    pub path: String,
}
