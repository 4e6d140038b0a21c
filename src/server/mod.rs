//! Server module
//!
//! [`Server`] owns the configuration, route table and error-page map. It
//! is constructed and configured before serving begins; request tasks
//! then share it read-only behind an `Arc`, so no synchronization is
//! needed on the hot path.

pub mod connection;
pub mod listener;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use regex::Regex;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, RouteConfig};
use crate::handler::dispatcher;
use crate::http::ResponseWriter;
use crate::logger::{self, AccessLogEntry, AccessLogFormat};
use crate::routing::{Route, RouteTable};

type FaultObserver = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// A static-content server instance
pub struct Server {
    config: Config,
    routes: RouteTable,
    error_pages: HashMap<u16, String>,
    writer: ResponseWriter,
    root: PathBuf,
    access_log_format: AccessLogFormat,
    on_fault: Option<FaultObserver>,
}

impl Server {
    /// Build a server from configuration, registering any routes and
    /// error pages the config file declares.
    pub fn new(config: Config) -> Self {
        let writer = ResponseWriter::new(config.http.server_name.clone());
        let mut server = Self {
            root: PathBuf::from(&config.site.root),
            access_log_format: AccessLogFormat::parse(&config.logging.access_log_format),
            routes: RouteTable::new(),
            error_pages: config.routes.error_pages.clone(),
            writer,
            on_fault: None,
            config,
        };
        server.register_config_routes();
        server
    }

    /// Lower config-file route declarations into the route table
    fn register_config_routes(&mut self) {
        let routes = self.config.routes.clone();
        for (url, route) in &routes.custom {
            self.add_route(url, self.lower_route_config(route));
        }
        for pattern in &routes.patterns {
            match Regex::new(&pattern.pattern) {
                Ok(re) => self.add_route("", Route::file(pattern.path.clone()).with_pattern(re)),
                // A route we cannot compile is treated as absent
                Err(e) => logger::log_warning(&format!(
                    "Skipping misconfigured pattern route '{}': {e}",
                    pattern.pattern
                )),
            }
        }
    }

    fn lower_route_config(&self, route: &RouteConfig) -> Route {
        match route {
            RouteConfig::File { path } => Route::file(path.clone()),
            RouteConfig::Redirect { target } => {
                let writer = self.writer.clone();
                let target = target.clone();
                Route::handler(move |_ctx| {
                    let response = writer.redirect(&target);
                    async move { response }
                })
            }
        }
    }

    /// Register a route; replaces a prior literal entry for the same URL
    pub fn add_route(&mut self, url: &str, route: Route) {
        self.routes.register(url, route);
    }

    /// Replace all registered routes
    pub fn set_routes(&mut self, routes: impl IntoIterator<Item = (String, Route)>) {
        self.routes.clear();
        for (url, route) in routes {
            self.routes.register(&url, route);
        }
    }

    /// Replace the error-page map (status code -> file path)
    pub fn set_errors(&mut self, error_pages: HashMap<u16, String>) {
        self.error_pages = error_pages;
    }

    /// Install the fault observer, called once per handler fault with the
    /// failing request's path and the failure detail
    pub fn on_fault(&mut self, observer: impl Fn(&str, &str) + Send + Sync + 'static) {
        self.on_fault = Some(Arc::new(observer));
    }

    pub(crate) fn notify_fault(&self, path: &str, detail: &str) {
        match &self.on_fault {
            Some(observer) => observer(path, detail),
            None => logger::log_handler_fault(path, detail),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn error_pages(&self) -> &HashMap<u16, String> {
        &self.error_pages
    }

    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_max_age(&self) -> u64 {
        self.config.site.cache_max_age
    }

    pub fn max_body_size(&self) -> u64 {
        self.config.http.max_body_size
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Serve a request: route the URI path and emit exactly one response
    pub async fn serve<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: std::fmt::Display,
    {
        dispatcher::serve_route(self, None, req).await
    }

    /// Serve a request for an explicit path, ignoring the request URI
    pub async fn serve_route<B>(
        &self,
        explicit_path: Option<&str>,
        req: Request<B>,
    ) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: std::fmt::Display,
    {
        dispatcher::serve_route(self, explicit_path, req).await
    }

    /// Whether a URL resolves to any registered route
    pub fn exists(&self, url: &str) -> bool {
        self.routes.exists(url)
    }

    /// Connection-facing entry point: serve the request and write the
    /// access log. Never fails; every failure has already been converted
    /// to an HTTP response further down.
    pub async fn handle<B>(
        &self,
        req: Request<B>,
        remote_addr: SocketAddr,
    ) -> Result<Response<Full<Bytes>>, Infallible>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: std::fmt::Display,
    {
        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let http_version = version_str(req.version());
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        logger::log_headers_count(req.headers().len(), self.config.logging.show_headers);

        let response = self.serve(req).await;

        if self.config.logging.access_log {
            let body_bytes = response
                .headers()
                .get("content-length")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let entry = AccessLogEntry {
                remote_addr: remote_addr.to_string(),
                time: chrono::Local::now(),
                method,
                path,
                http_version: http_version.to_string(),
                status: response.status().as_u16(),
                body_bytes,
                user_agent,
                request_time_us: u64::try_from(started.elapsed().as_micros())
                    .unwrap_or(u64::MAX),
            };
            logger::log_access(&entry, self.access_log_format);
        }

        Ok(response)
    }
}

fn version_str(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config::{
        HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig, ServerConfig, SiteConfig,
    };

    /// Server over a temp root with quiet logging, for handler tests
    pub fn test_server(root: &Path) -> Server {
        Server::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            site: SiteConfig {
                root: root.display().to_string(),
                cache_max_age: 3600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                show_headers: false,
                access_log_format: "combined".to_string(),
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
            http: HttpConfig {
                server_name: "Statica/0.1".to_string(),
                max_body_size: 1024 * 1024,
            },
            routes: RoutesConfig::default(),
        })
    }

    #[tokio::test]
    async fn test_config_redirect_route() {
        use http_body_util::Full;
        use hyper::body::Bytes;

        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut server = test_server(dir.path());
        server.add_route(
            "/old",
            server.lower_route_config(&RouteConfig::Redirect {
                target: "/new".to_string(),
            }),
        );

        let req = Request::builder()
            .uri("/old")
            .body(Full::new(Bytes::new()))
            .expect("valid request");
        let res = server.serve(req).await;
        assert_eq!(res.status(), hyper::StatusCode::MOVED_PERMANENTLY);
        assert_eq!(res.headers()["location"], "/new");
    }

    #[test]
    fn test_misconfigured_pattern_is_skipped() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut server = test_server(dir.path());
        let mut config = server.config.clone();
        config.routes.patterns.push(crate::config::PatternRouteConfig {
            pattern: "([unclosed".to_string(),
            path: "/x.html".to_string(),
        });
        server.config = config;
        server.register_config_routes();

        // The bad pattern is ignored; lookups see no route
        assert!(!server.exists("/anything"));
    }

    #[test]
    fn test_exists() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut server = test_server(dir.path());
        server.add_route("/here", Route::file("/here.html"));
        assert!(server.exists("/here"));
        assert!(server.exists("/here/"));
        assert!(!server.exists("/elsewhere"));
    }
}
