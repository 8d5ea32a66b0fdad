//! The request adapter: first stage of every pipeline.
//!
//! Wraps the raw hyper request in exactly one [`Request`] decorator and
//! forwards it into the middleware chain exactly once. It runs on every
//! request, unconditionally: no filtering, no short-circuiting, and no
//! error handling on behalf of downstream stages (their failures surface
//! as whatever response they produce).

use std::collections::HashMap;
use std::net::SocketAddr;

use http::StatusCode;
use http_body_util::BodyExt;
use tracing::debug;

use crate::middleware::Next;
use crate::request::Request;
use crate::response::Response;

/// Adapts one raw request and hands it to the rest of the pipeline.
///
/// The body is read off the wire in full before the decorator exists, so
/// downstream stages see a complete request. A transport error while
/// reading is the one failure the adapter itself can observe; it answers
/// `400 Bad Request` and never constructs a partial wrapper.
pub(crate) async fn run<B>(
    raw: http::Request<B>,
    remote_addr: SocketAddr,
    params: HashMap<String, String>,
    next: Next,
) -> Response
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = raw.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(peer = %remote_addr, "failed to read request body: {e}");
            return Response::status(StatusCode::BAD_REQUEST);
        }
    };

    next.run(Request::new(parts, body, params, remote_addr)).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use bytes::Bytes;
    use http_body_util::Full;

    use super::*;
    use crate::handler::Handler;
    use crate::middleware::BoxedMiddleware;

    fn empty_stack() -> Arc<[BoxedMiddleware]> {
        Arc::new([])
    }

    fn next_counting(forwards: &Arc<AtomicUsize>) -> Next {
        let forwards = Arc::clone(forwards);
        let handler = move |req: Request| {
            let forwards = Arc::clone(&forwards);
            async move {
                forwards.fetch_add(1, Ordering::SeqCst);
                Response::text(format!("got {} bytes", req.body().len()))
            }
        };
        Next::new(empty_stack(), handler.into_boxed_handler())
    }

    #[tokio::test]
    async fn wraps_once_and_forwards_once() {
        let forwards = Arc::new(AtomicUsize::new(0));
        let raw = http::Request::builder()
            .method(http::Method::POST)
            .uri("/things")
            .body(Full::new(Bytes::from_static(b"payload")))
            .unwrap();

        let res = run(raw, "127.0.0.1:5000".parse().unwrap(), HashMap::new(), next_counting(&forwards)).await;

        assert_eq!(forwards.load(Ordering::SeqCst), 1);
        assert_eq!(res.body(), b"got 7 bytes");
    }

    #[tokio::test]
    async fn decorator_carries_the_original_request_through() {
        let handler = |req: Request| async move {
            assert_eq!(req.method(), http::Method::PUT);
            assert_eq!(req.path(), "/users/7");
            assert_eq!(req.header("x-tag"), Some("alpha"));
            assert_eq!(req.param("id"), Some("7"));
            assert_eq!(req.body(), b"data");
            Response::status(StatusCode::NO_CONTENT)
        };
        let next = Next::new(empty_stack(), handler.into_boxed_handler());

        let raw = http::Request::builder()
            .method(http::Method::PUT)
            .uri("/users/7")
            .header("x-tag", "alpha")
            .body(Full::new(Bytes::from_static(b"data")))
            .unwrap();
        let params = HashMap::from([("id".to_owned(), "7".to_owned())]);

        let res = run(raw, "10.0.0.1:4242".parse().unwrap(), params, next).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }
}
