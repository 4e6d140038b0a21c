//! Connection handling module
//!
//! One spawned task per accepted connection: wrap the stream, configure
//! HTTP/1.1 keep-alive, serve requests through the dispatcher and apply
//! the configured connection timeout.

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::logger;
use crate::server::Server;

/// Handle a single connection in a spawned task
pub fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, server: Arc<Server>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &server.config().performance;
        let keep_alive = performance.keep_alive_timeout > 0;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let service_server = Arc::clone(&server);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let server = Arc::clone(&service_server);
                async move { server.handle(req, peer_addr).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {}s",
                timeout_duration.as_secs()
            )),
        }
    });
}
