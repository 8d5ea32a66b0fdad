//! The JSON response envelope.
//!
//! Every result that leaves through this path is wrapped in a fixed-shape
//! object with a single `body` field:
//!
//! ```json
//! {"body": {"id": 1}}
//! ```
//!
//! The envelope does not interpret the result beyond placing it under
//! `body`, and it always answers `200 OK`. That status is unconditional:
//! an error value enveloped here still goes out as a 200. Call sites that
//! need a failure status must build a [`Response`] directly; the envelope
//! path cannot express one.

use serde::Serialize;
use tracing::error;

use crate::error::Error;
use crate::response::{IntoResponse, Response};

/// Fixed-shape wrapper placed around a handler result before serialization.
///
/// ```rust
/// use manila::Envelope;
///
/// let res = Envelope::new("ok").to_response().unwrap();
/// assert_eq!(res.status_code(), manila::StatusCode::OK);
/// assert_eq!(res.body(), br#"{"body":"ok"}"#);
/// ```
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    body: T,
}

impl<T> Envelope<T> {
    /// Wraps a result object. The object is stored as-is and only touched
    /// again at serialization time.
    pub fn new(body: T) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn into_body(self) -> T {
        self.body
    }
}

impl<T: Serialize> Envelope<T> {
    /// Serializes the envelope into a `200 OK` JSON response.
    ///
    /// Borrows rather than consumes: the same envelope serialized twice
    /// produces structurally identical responses.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] if the wrapped result has no JSON
    /// representation (a map with non-string keys, a `Serialize` impl
    /// that fails, ...).
    pub fn to_response(&self) -> Result<Response, Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(Response::json(bytes))
    }
}

/// Lets handlers return an envelope directly.
///
/// This path is infallible by contract, so a result object that fails to
/// serialize degrades to `500 Internal Server Error` with the failure
/// logged. Use [`Envelope::to_response`] to observe the error instead.
impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        match self.to_response() {
            Ok(res) => res,
            Err(e) => {
                error!("envelope serialization failed: {e}");
                Response::status(http::StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
