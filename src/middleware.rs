//! Middleware: explicit request/response interception.
//!
//! A middleware is any `async fn(Request, Next) -> impl IntoResponse`. It
//! receives the decorated request and a [`Next`] continuation; calling
//! `next.run(req)` hands the request to the remaining stages and, last,
//! the route handler. A stage that never calls `next` short-circuits the
//! chain and its response goes out directly.
//!
//! Stages run in registration order and hold no cross-request state; the
//! chain is shared immutably across concurrent requests.
//!
//! ```rust,no_run
//! use manila::{middleware, Next, Request, Response, Router};
//!
//! async fn deny_robots(req: Request, next: Next) -> Response {
//!     if req.header("user-agent").is_some_and(|ua| ua.contains("bot")) {
//!         return Response::status(manila::StatusCode::FORBIDDEN);
//!     }
//!     next.run(req).await
//! }
//!
//! let app = Router::new()
//!     .layer(middleware::trace)
//!     .layer(deny_robots);
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Internal dispatch interface, same erasure scheme as route handlers.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// A type-erased middleware stage shared across concurrent requests.
#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Implemented for every valid middleware stage.
///
/// Never implemented by hand; automatically satisfied for any
/// `async fn(Request, Next) -> impl IntoResponse`. Sealed like
/// [`Handler`](crate::Handler).
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the pipeline, from the current stage's point of view.
///
/// Consumed by [`run`](Next::run): a stage forwards at most once, and the
/// type system enforces it.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    index: usize,
    handler: BoxedHandler,
}

impl Next {
    pub(crate) fn new(stack: Arc<[BoxedMiddleware]>, handler: BoxedHandler) -> Self {
        Self { stack, index: 0, handler }
    }

    /// Runs the remaining middleware stages, then the route handler.
    pub async fn run(self, req: Request) -> Response {
        match self.stack.get(self.index) {
            Some(stage) => {
                let stage = Arc::clone(stage);
                let next = Self {
                    stack: self.stack,
                    index: self.index + 1,
                    handler: self.handler,
                };
                stage.call(req, next).await
            }
            None => self.handler.call(req).await,
        }
    }
}

// ── Provided middleware ───────────────────────────────────────────────────────

/// Per-request log line: method, path, response status, latency.
///
/// ```rust,no_run
/// use manila::{middleware, Router};
///
/// let app = Router::new().layer(middleware::trace);
/// ```
pub async fn trace(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.path().to_owned();
    let start = Instant::now();

    let res = next.run(req).await;

    info!(
        %method,
        path = %path,
        status = res.status_code().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    res
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::handler::Handler;

    fn request() -> Request {
        let (parts, ()) = http::Request::builder()
            .uri("/probe")
            .body(())
            .unwrap()
            .into_parts();
        Request::new(parts, Bytes::new(), HashMap::new(), "127.0.0.1:1".parse().unwrap())
    }

    fn chain(stages: Vec<BoxedMiddleware>, handler: impl Handler) -> Next {
        Next::new(Arc::from(stages.as_slice()), handler.into_boxed_handler())
    }

    #[tokio::test]
    async fn empty_chain_reaches_the_handler_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = {
            let hits = Arc::clone(&hits);
            move |_req: Request| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Response::text("done")
                }
            }
        };

        let res = chain(Vec::new(), handler).run(request()).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stages_run_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        fn recording(
            order: &Arc<std::sync::Mutex<Vec<&'static str>>>,
            tag: &'static str,
        ) -> BoxedMiddleware {
            let order = Arc::clone(order);
            (move |req: Request, next: Next| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(tag);
                    next.run(req).await
                }
            })
            .into_boxed_middleware()
        }

        let stages = vec![recording(&order, "first"), recording(&order, "second")];
        let handler = {
            let order = Arc::clone(&order);
            move |_req: Request| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push("handler");
                    Response::status(StatusCode::NO_CONTENT)
                }
            }
        };

        chain(stages, handler).run(request()).await;
        assert_eq!(*order.lock().unwrap(), ["first", "second", "handler"]);
    }

    #[tokio::test]
    async fn a_stage_that_skips_next_short_circuits() {
        let reached = Arc::new(AtomicUsize::new(0));

        let gate =
            (|_req: Request, _next: Next| async { Response::status(StatusCode::FORBIDDEN) })
                .into_boxed_middleware();

        let handler = {
            let reached = Arc::clone(&reached);
            move |_req: Request| {
                let reached = Arc::clone(&reached);
                async move {
                    reached.fetch_add(1, Ordering::SeqCst);
                    Response::text("unreachable")
                }
            }
        };

        let res = chain(vec![gate], handler).run(request()).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }
}
