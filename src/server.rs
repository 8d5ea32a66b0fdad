//! HTTP server and graceful shutdown.
//!
//! There are no container lifecycle hooks here: the server's whole life is
//! explicit. [`Server::bind`] names the address, [`Server::serve`] owns the
//! socket until shutdown, and drop cleans up. Shutdown is graceful: on
//! SIGTERM or Ctrl-C the accept loop stops immediately and every in-flight
//! connection is drained before `serve` returns. Under Kubernetes, set
//! `terminationGracePeriodSeconds` longer than your slowest request.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::adapter;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown: SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        Self::serve_on(listener, router, shutdown_signal()).await
    }

    /// Serves on an already-bound listener until `shutdown` resolves.
    ///
    /// Useful for embedding and for tests: bind to port 0, read the local
    /// address off the listener, and resolve `shutdown` when done.
    pub async fn serve_on(
        listener: TcpListener,
        router: Router,
        shutdown: impl Future<Output = ()> + Send,
    ) -> Result<(), Error> {
        let stack = router.middleware_stack();
        let router = Arc::new(router);
        let not_found = not_found_fallback();

        let addr = listener.local_addr()?;
        info!(%addr, "manila listening");

        // JoinSet tracks every connection task so shutdown can drain them.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a shutdown signal must
                // stop the accept loop even if connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let stack = Arc::clone(&stack);
                    let not_found = Arc::clone(&not_found);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection, not
                        // once per connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            let stack = Arc::clone(&stack);
                            let not_found = Arc::clone(&not_found);
                            async move { dispatch(router, stack, not_found, req, remote_addr).await }
                        });

                        // Serves HTTP/1.1 or HTTP/2, whichever the client
                        // negotiated.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the set does not grow unbounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("manila stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request through the adapter and the middleware chain.
///
/// The adapter runs on every request, matched or not: an unmatched path
/// goes through the same wrap-and-forward pipeline into the 404 fallback
/// handler, so middleware observes those requests too. The error type is
/// [`Infallible`]: every outcome is an HTTP response, so hyper never sees
/// an error from us.
async fn dispatch(
    router: Arc<Router>,
    stack: Arc<[BoxedMiddleware]>,
    not_found: BoxedHandler,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let (handler, params) = router
        .lookup(&method, &path)
        .unwrap_or_else(|| (not_found, HashMap::new()));

    let response = adapter::run(req, remote_addr, params, Next::new(stack, handler)).await;
    Ok(response.into_inner())
}

/// The handler behind every unmatched path.
fn not_found_fallback() -> BoxedHandler {
    (|_req: Request| async { Response::status(http::StatusCode::NOT_FOUND) }).into_boxed_handler()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this is SIGTERM (what Kubernetes sends) or SIGINT (Ctrl-C for
/// local dev). On other platforms only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
