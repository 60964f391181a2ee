use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobError;
use crate::types::{BlobMetadata, ResolvedBlob};

/// Pluggable blob storage backend for uploaded files.
///
/// Keys are generated by the store on `put` and are stable relative paths,
/// so they can be persisted in database rows and served back verbatim.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under `namespace` and return its metadata.
    ///
    /// The store assigns a unique key and computes a `SHA-256` checksum.
    async fn put(
        &self,
        namespace: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<BlobMetadata, BlobError>;

    /// Retrieve a blob by key, returning both metadata and content.
    ///
    /// Returns `None` if the blob does not exist.
    async fn get(&self, key: &str) -> Result<Option<ResolvedBlob>, BlobError>;

    /// Delete a blob by key. Returns `true` if the blob existed.
    async fn delete(&self, key: &str) -> Result<bool, BlobError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_dyn_store(_: &dyn BlobStore) {}
}
