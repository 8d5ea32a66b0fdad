//! Unified error type.

/// The error type returned by manila's fallible operations.
///
/// Application-level outcomes (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type covers
/// infrastructure failures (binding a port, accepting a connection) and
/// result objects that cannot be represented as JSON.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A result object handed to an [`Envelope`](crate::Envelope) has no
    /// JSON representation.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
