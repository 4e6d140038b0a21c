//! Request dispatch module
//!
//! Resolves a request to a route and executes it. The routing state
//! machine: no route -> the path is served as a literal file under the
//! root; a method table dispatches on the request method (an unmatched
//! method is a 404, no fallback); handlers run behind the fault boundary;
//! file routes go to the file server. Every branch emits exactly one
//! response.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderMap;
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode};

use crate::logger;
use crate::routing::{HandlerFn, MethodEntry, RequestContext, RouteKind};
use crate::server::Server;

use super::{body, fault, file_server};

/// Resolve and execute a route for the request
///
/// `explicit_path` overrides the request URI's path when provided.
pub async fn serve_route<B>(
    server: &Server,
    explicit_path: Option<&str>,
    req: Request<B>,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: std::fmt::Display,
{
    let (parts, req_body) = req.into_parts();
    let path = explicit_path.map_or_else(|| parts.uri.path().to_string(), ToString::to_string);

    // Routes are fixed before serving begins, so cloning the matched
    // route is a shallow copy (paths and Arc'd handlers).
    let route = server.routes().lookup(&path).cloned();

    match route {
        // Unmatched URLs are treated as literal file paths under root
        None => file_server::serve_file(server, &path, None, &parts.headers, &[]).await,
        Some(route) => match route.kind {
            RouteKind::FilePath(file) => {
                file_server::serve_file(server, &file, None, &parts.headers, &[]).await
            }
            RouteKind::Handler(handler) => {
                run_handler(server, handler, &parts, req_body, &path).await
            }
            RouteKind::MethodTable(table) => match table.get(&canonical_method(&parts.method)) {
                Some(MethodEntry::File(file)) => {
                    file_server::serve_file(server, file, None, &parts.headers, &[]).await
                }
                Some(MethodEntry::Handler(handler)) => {
                    run_handler(server, handler.clone(), &parts, req_body, &path).await
                }
                // No entry for this method: 404, no fallback to other verbs
                None => error_response(server, 404, "Not found", &parts.headers).await,
            },
        },
    }
}

/// Method tokens compare case-insensitively in a method table
///
/// Non-canonical casings parse as extension methods with their case
/// preserved, so they are uppercased before indexing the table.
fn canonical_method(method: &Method) -> Method {
    Method::from_bytes(method.as_str().to_ascii_uppercase().as_bytes())
        .unwrap_or_else(|_| method.clone())
}

/// Accumulate the body, then invoke the handler under the fault boundary
async fn run_handler<B>(
    server: &Server,
    handler: HandlerFn,
    parts: &Parts,
    req_body: B,
    path: &str,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send,
    B::Error: std::fmt::Display,
{
    let collected = body::collect(req_body, server.max_body_size()).await;
    let ctx = RequestContext {
        method: parts.method.clone(),
        path: path.to_string(),
        headers: parts.headers.clone(),
        body: collected,
    };

    match fault::invoke(handler, ctx).await {
        Ok(response) => response,
        Err(detail) => {
            server.notify_fault(path, &detail);
            error_response(server, 500, "Internal Server Error", &parts.headers).await
        }
    }
}

/// Emit an error response
///
/// When an error page is configured for the status it is served through
/// the file server with `Cache-Control: no-cache` forced (error pages are
/// never cached). A missing or unreadable error page falls back to the
/// plain text message instead of recursing into the 404 path.
pub async fn error_response(
    server: &Server,
    status: u16,
    message: &str,
    req_headers: &HeaderMap,
) -> Response<Full<Bytes>> {
    let status_code =
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if let Some(page) = server.error_pages().get(&status) {
        match file_server::try_serve(
            server,
            page,
            Some(status_code),
            req_headers,
            &[("Cache-Control", "no-cache".to_string())],
        )
        .await
        {
            Ok(response) => return response,
            Err(e) => {
                logger::log_warning(&format!("Error page for {status} unavailable: {e}"));
            }
        }
    }

    server.writer().send_res(
        status_code,
        "text/plain",
        Some(Bytes::from(message.to_string())),
        &[],
    )
}
