//! HTTP response building module
//!
//! [`ResponseWriter`] composes status line, headers and body for every
//! response the server emits. Headers start from a base set (Content-Type
//! and Server) and caller-supplied headers overlay them; an empty override
//! value leaves the default standing.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};

use crate::logger;

/// Composes and emits HTTP responses
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    server_name: String,
}

impl ResponseWriter {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
        }
    }

    /// Build a response with the given status, MIME type, optional content
    /// and additional headers.
    ///
    /// The header set starts from `Content-Type` (falling back to
    /// `text/plain` when `mime_type` is empty) and `Server`, then overlays
    /// `other_headers`: a non-empty supplied value replaces the default,
    /// an empty value leaves the default standing. A `None` content yields
    /// an empty body.
    pub fn send_res(
        &self,
        status: StatusCode,
        mime_type: &str,
        content: Option<Bytes>,
        other_headers: &[(&str, String)],
    ) -> Response<Full<Bytes>> {
        let mime_type = if mime_type.is_empty() {
            "text/plain"
        } else {
            mime_type
        };

        let mut response = Response::new(Full::new(content.unwrap_or_default()));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        if let Ok(v) = HeaderValue::from_str(mime_type) {
            headers.insert(hyper::header::CONTENT_TYPE, v);
        }
        if let Ok(v) = HeaderValue::from_str(&self.server_name) {
            headers.insert(hyper::header::SERVER, v);
        }

        overlay_headers(response.headers_mut(), other_headers);
        response
    }

    /// Build a 301 redirect to `new_url`
    pub fn redirect(&self, new_url: &str) -> Response<Full<Bytes>> {
        self.send_res(
            StatusCode::MOVED_PERMANENTLY,
            "text/plain",
            Some(Bytes::from_static(b"Redirecting")),
            &[("Location", new_url.to_string())],
        )
    }

    /// Build a 304 Not Modified response
    ///
    /// Carries only transport/cache-class headers: `Server`, `Etag`,
    /// `Date` and whatever the caller merges in. Entity headers
    /// (Content-Type, Content-Length, Last-Modified, ...) must be absent,
    /// so this bypasses the `send_res` base set.
    pub fn not_modified(
        &self,
        etag: &str,
        date: &str,
        other_headers: &[(&str, String)],
    ) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NOT_MODIFIED;

        let headers = response.headers_mut();
        if let Ok(v) = HeaderValue::from_str(&self.server_name) {
            headers.insert(hyper::header::SERVER, v);
        }
        if let Ok(v) = HeaderValue::from_str(etag) {
            headers.insert(hyper::header::ETAG, v);
        }
        if let Ok(v) = HeaderValue::from_str(date) {
            headers.insert(hyper::header::DATE, v);
        }

        overlay_headers(response.headers_mut(), other_headers);
        response
    }
}

/// Overlay caller-supplied headers onto an existing header map
///
/// Non-empty values replace existing entries; empty values are skipped so
/// the default stands. Invalid header names or values are logged and
/// dropped rather than aborting the response.
fn overlay_headers(headers: &mut hyper::HeaderMap, other_headers: &[(&str, String)]) {
    for (name, value) in other_headers {
        if value.is_empty() {
            continue;
        }
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => logger::log_warning(&format!("Dropping invalid header: {name}: {value}")),
        }
    }
}
