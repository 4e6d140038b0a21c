//! Fault boundary module
//!
//! Wraps one handler invocation so an unexpected panic becomes an error
//! value instead of tearing down the connection task or the process. The
//! handler runs in its own spawned task; a panic is absorbed by the task
//! boundary and surfaces here as a failed join. Isolation is per request:
//! a fault in one handler has no effect on concurrently running requests.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::routing::{HandlerFn, RequestContext};

/// Invoke a handler under the fault boundary
///
/// Returns the handler's response, or the failure detail when the handler
/// panicked (synchronously or at any await point).
pub async fn invoke(handler: HandlerFn, ctx: RequestContext) -> Result<Response<Full<Bytes>>, String> {
    let task = tokio::spawn(async move { handler(ctx).await });
    match task.await {
        Ok(response) => Ok(response),
        Err(join_error) if join_error.is_panic() => Err(panic_detail(join_error.into_panic())),
        Err(join_error) => Err(format!("handler task failed: {join_error}")),
    }
}

/// Extract a printable message from a panic payload
fn panic_detail(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked with a non-string payload".to_string()
    }
}
