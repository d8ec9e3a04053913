//! Error types for remote store operations.

/// Errors returned by remote store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("remote store rejected request (status={status}, code={code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// A record came back without an identifier.
    #[error("record is missing an id")]
    MissingId,
    /// The target collection is not configured.
    #[error("collection not configured: {0}")]
    NotConfigured(String),
    /// Failure reported by a non-HTTP store.
    #[error("store error: {0}")]
    Other(String),
}
