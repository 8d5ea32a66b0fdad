//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them on your router:
//!
//! ```rust,no_run
//! use manila::{health, Router};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Both answer through the envelope, like everything else in manila:
//! `{"body":"ok"}` and `{"body":"ready"}`. Override `readiness` with your
//! own handler to gate on dependency availability.

use crate::{Envelope, Request};

/// Kubernetes liveness probe handler.
///
/// Always `200 OK` with `{"body":"ok"}`. If the process can respond to
/// HTTP at all, it is alive; this handler intentionally has no
/// dependencies.
pub async fn liveness(_req: Request) -> Envelope<&'static str> {
    Envelope::new("ok")
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Always `200 OK` with `{"body":"ready"}`. Replace it if your application
/// needs a warm-up period or must verify dependency health first.
pub async fn readiness(_req: Request) -> Envelope<&'static str> {
    Envelope::new("ready")
}
