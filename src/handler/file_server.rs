//! File serving module
//!
//! Serves a file from the configured site root with conditional-GET
//! semantics: stat, compute validators (`ETag` from inode/size/mtime,
//! `Last-Modified`), test the client's `If-None-Match` /
//! `If-Modified-Since`, and emit either a 304 or the file content with
//! caching headers.

use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::http::{caching, mime};
use crate::logger;
use crate::server::Server;

use super::dispatcher;

/// File-serving failure
#[derive(Debug, Error)]
pub enum FileError {
    /// Stat failed or the target is not a regular file
    #[error("not found or not a regular file")]
    NotFound,
    /// The file statted fine but reading it failed
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),
}

/// Serve a file, converting failures into error responses
///
/// `NotFound` becomes the 404 error path; a read failure after a
/// successful stat is logged and becomes a 500.
pub async fn serve_file(
    server: &Server,
    path: &str,
    status_override: Option<StatusCode>,
    req_headers: &HeaderMap,
    additional_headers: &[(&str, String)],
) -> Response<Full<Bytes>> {
    match try_serve(server, path, status_override, req_headers, additional_headers).await {
        Ok(response) => response,
        Err(FileError::NotFound) => {
            dispatcher::error_response(server, 404, "Not found", req_headers).await
        }
        Err(FileError::Read(e)) => {
            logger::log_error(&format!("Failed to read '{path}': {e}"));
            dispatcher::error_response(server, 500, "Internal Server Error", req_headers).await
        }
    }
}

/// Serve a file, surfacing failures to the caller
///
/// The error responder uses this directly so a missing error page falls
/// back to a plain text response instead of recursing.
pub async fn try_serve(
    server: &Server,
    path: &str,
    status_override: Option<StatusCode>,
    req_headers: &HeaderMap,
    additional_headers: &[(&str, String)],
) -> Result<Response<Full<Bytes>>, FileError> {
    let full_path = resolve_path(server.root(), path)?;

    // lstat semantics: a symlink or directory target is not a regular file
    let meta = tokio::fs::symlink_metadata(&full_path)
        .await
        .map_err(|_| FileError::NotFound)?;
    if !meta.is_file() {
        return Err(FileError::NotFound);
    }

    // Cache validators
    let mtime = caching::mtime_utc(meta.modified()?);
    let etag = caching::file_etag(inode(&meta), meta.len(), mtime);
    let content_type = mime::mime_type(&full_path);
    let now = caching::http_date(Utc::now());

    let if_none_match = header_str(req_headers, "if-none-match");
    let if_modified_since = header_str(req_headers, "if-modified-since");

    if caching::is_revalidation_hit(if_none_match, if_modified_since, &etag, mtime) {
        return Ok(server
            .writer()
            .not_modified(&etag, &now, additional_headers));
    }

    // Zero-length files skip the read entirely
    let body = if meta.len() == 0 {
        Bytes::new()
    } else {
        Bytes::from(tokio::fs::read(&full_path).await?)
    };

    let mut headers: Vec<(&str, String)> = vec![
        ("Cache-Control", format!("max-age={}", server.cache_max_age())),
        ("Content-Length", meta.len().to_string()),
        ("Date", now),
        ("Last-Modified", caching::http_date(mtime)),
        ("Etag", etag),
    ];
    // Caller-supplied headers win over the defaults above
    headers.extend(additional_headers.iter().map(|(n, v)| (*n, v.clone())));

    let status = status_override.unwrap_or(StatusCode::OK);
    Ok(server
        .writer()
        .send_res(status, content_type, Some(body), &headers))
}

/// Resolve a request path against the root, rejecting traversal
fn resolve_path(root: &Path, path: &str) -> Result<PathBuf, FileError> {
    let relative = path.trim_start_matches('/');
    if Path::new(relative)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return Err(FileError::NotFound);
    }
    Ok(root.join(relative))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(unix)]
fn inode(meta: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode(_meta: &std::fs::Metadata) -> u64 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::tests::test_server;
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes()
    }

    fn site() -> (TempDir, Server) {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("page.html"), b"<h1>hi</h1>").expect("write fixture");
        std::fs::write(dir.path().join("empty.txt"), b"").expect("write fixture");
        let server = test_server(dir.path());
        (dir, server)
    }

    #[tokio::test]
    async fn test_serves_file_with_caching_headers() {
        let (_dir, server) = site();
        let res = serve_file(&server, "/page.html", None, &HeaderMap::new(), &[]).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(res.headers()["cache-control"], "max-age=3600");
        assert_eq!(res.headers()["content-length"], "11");
        assert!(res.headers().contains_key("etag"));
        assert!(res.headers().contains_key("date"));
        assert!(res.headers().contains_key("last-modified"));
        assert_eq!(body_bytes(res).await.as_ref(), b"<h1>hi</h1>");
    }

    #[tokio::test]
    async fn test_conditional_get_round_trip() {
        let (_dir, server) = site();
        let first = serve_file(&server, "/page.html", None, &HeaderMap::new(), &[]).await;
        let etag = first.headers()["etag"].to_str().expect("ascii").to_string();

        let mut headers = HeaderMap::new();
        headers.insert("if-none-match", etag.parse().expect("valid header"));
        let second = serve_file(&server, "/page.html", None, &headers, &[]).await;

        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        // No entity headers on a 304
        assert!(second.headers().get("content-type").is_none());
        assert!(second.headers().get("content-length").is_none());
        assert!(second.headers().get("last-modified").is_none());
        assert!(body_bytes(second).await.is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_etag_beats_satisfied_time_check() {
        let (_dir, server) = site();
        let first = serve_file(&server, "/page.html", None, &HeaderMap::new(), &[]).await;
        let last_modified = first.headers()["last-modified"]
            .to_str()
            .expect("ascii")
            .to_string();
        let tomorrow = caching::parse_http_date(&last_modified).expect("valid")
            + chrono::Duration::days(1);

        let mut headers = HeaderMap::new();
        headers.insert("if-none-match", "\"stale\"".parse().expect("valid header"));
        headers.insert(
            "if-modified-since",
            caching::http_date(tomorrow).parse().expect("valid header"),
        );
        let res = serve_file(&server, "/page.html", None, &headers, &[]).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_if_modified_since_hit() {
        let (_dir, server) = site();
        let first = serve_file(&server, "/page.html", None, &HeaderMap::new(), &[]).await;
        let last_modified = first.headers()["last-modified"]
            .to_str()
            .expect("ascii")
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            "if-modified-since",
            last_modified.parse().expect("valid header"),
        );
        let res = serve_file(&server, "/page.html", None, &headers, &[]).await;
        assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_zero_length_file() {
        let (_dir, server) = site();
        let res = serve_file(&server, "/empty.txt", None, &HeaderMap::new(), &[]).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-length"], "0");
        assert!(body_bytes(res).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let (_dir, server) = site();
        let res = serve_file(&server, "/nope.html", None, &HeaderMap::new(), &[]).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_target_is_404() {
        let (dir, server) = site();
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        let res = serve_file(&server, "/sub", None, &HeaderMap::new(), &[]).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_blocked() {
        let (_dir, server) = site();
        let res = serve_file(&server, "/../secret.txt", None, &HeaderMap::new(), &[]).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_override() {
        let (_dir, server) = site();
        let res = serve_file(
            &server,
            "/page.html",
            Some(StatusCode::NOT_FOUND),
            &HeaderMap::new(),
            &[],
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(res).await.as_ref(), b"<h1>hi</h1>");
    }
}
