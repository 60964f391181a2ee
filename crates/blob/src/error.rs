use thiserror::Error;

/// Errors that can occur during blob storage operations.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The blob exceeds the maximum allowed size.
    #[error("blob too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        limit: u64,
    },

    /// The key is empty, absolute, or escapes the storage root.
    #[error("invalid blob key: {0}")]
    InvalidKey(String),

    /// A storage backend error occurred.
    #[error("blob storage error: {0}")]
    Storage(String),
}
