use thiserror::Error;

/// Errors returned by workflow operations.
///
/// The first four variants carry a caller-facing reason; the rest wrap
/// backend failures.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The target does not exist, or exists but is not visible to the requester.
    #[error("{0}")]
    NotFound(String),

    /// The requester's role or ownership does not permit the operation.
    #[error("{0}")]
    PermissionDenied(String),

    /// Malformed input (bad action literal, empty upload, blank title).
    #[error("{0}")]
    InvalidArgument(String),

    /// The target is not in a state that allows the transition.
    #[error("{0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] signet_store::StoreError),

    #[error("blob error: {0}")]
    Blob(#[from] signet_blob::BlobError),

    /// The engine was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}
