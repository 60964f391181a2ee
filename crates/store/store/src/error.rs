use thiserror::Error;

/// Errors from workflow store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    /// A referenced row (document, signature, user) does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}
