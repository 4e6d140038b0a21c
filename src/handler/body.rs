//! Request body accumulation module
//!
//! An explicit asynchronous read loop that collects body frames into a
//! single byte buffer. Handler routes receive the result only once the
//! whole body (or a terminal error) has been observed, so a handler never
//! has to subscribe to incremental body events.

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};

use crate::logger;

/// Fully accumulated request body
#[derive(Debug, Clone, Default)]
pub struct RequestBody {
    /// The accumulated bytes (possibly truncated, see `error`)
    pub data: Bytes,
    /// Terminal error flag: set when the transport failed mid-body or the
    /// configured size cap was exceeded
    pub error: Option<String>,
}

/// Accumulate the request body up to `max_size` bytes
///
/// Oversized bodies stop accumulating and set the error flag; transport
/// errors do the same. The returned value is complete in either case, so
/// awaiting this function is the body-completion signal.
pub async fn collect<B>(body: B, max_size: u64) -> RequestBody
where
    B: Body<Data = Bytes> + Send,
    B::Error: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);
    let mut data: Vec<u8> = Vec::new();
    let mut error = None;

    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                let Some(chunk) = frame.data_ref() else {
                    // Trailers; nothing to accumulate
                    continue;
                };
                if data.len() as u64 + chunk.len() as u64 > max_size {
                    logger::log_warning(&format!(
                        "Request body exceeds {max_size} bytes, truncating"
                    ));
                    error = Some(format!("request body larger than {max_size} bytes"));
                    break;
                }
                data.extend_from_slice(chunk);
            }
            Err(e) => {
                error = Some(e.to_string());
                break;
            }
        }
    }

    RequestBody {
        data: Bytes::from(data),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[tokio::test]
    async fn test_collect_full_body() {
        let body = Full::new(Bytes::from_static(b"hello world"));
        let collected = collect(body, 1024).await;
        assert_eq!(collected.data.as_ref(), b"hello world");
        assert!(collected.error.is_none());
    }

    #[tokio::test]
    async fn test_collect_empty_body() {
        let body = Full::new(Bytes::new());
        let collected = collect(body, 1024).await;
        assert!(collected.data.is_empty());
        assert!(collected.error.is_none());
    }

    #[tokio::test]
    async fn test_collect_oversized_body_sets_error() {
        let body = Full::new(Bytes::from(vec![0u8; 64]));
        let collected = collect(body, 16).await;
        assert!(collected.error.is_some());
        assert!(collected.data.len() <= 16);
    }
}
