use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::error::BlobError;
use crate::key;
use crate::store::BlobStore;
use crate::types::{BlobMetadata, ResolvedBlob};

/// In-memory blob store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, ResolvedBlob>,
    max_size: Option<u64>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject uploads larger than `limit` bytes.
    #[must_use]
    pub fn with_max_size(mut self, limit: u64) -> Self {
        self.max_size = Some(limit);
        self
    }

    /// Number of blobs currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        namespace: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<BlobMetadata, BlobError> {
        key::check_size(&data, self.max_size)?;
        let key = key::generate(namespace, filename)?;
        let metadata = key::metadata(key.clone(), filename, content_type, &data);
        self.blobs.insert(
            key,
            ResolvedBlob {
                metadata: metadata.clone(),
                data,
            },
        );
        Ok(metadata)
    }

    async fn get(&self, key: &str) -> Result<Option<ResolvedBlob>, BlobError> {
        key::validate(key)?;
        Ok(self.blobs.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, BlobError> {
        key::validate(key)?;
        Ok(self.blobs.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryBlobStore::new();
        let meta = store
            .put("signatures", "sig.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap();
        assert_eq!(meta.size_bytes, 3);
        assert_eq!(meta.filename, "sig.png");
        assert_eq!(store.len(), 1);

        let blob = store.get(&meta.key).await.unwrap().expect("blob exists");
        assert_eq!(blob.data, Bytes::from_static(b"png"));
        assert_eq!(blob.metadata, meta);

        assert!(store.delete(&meta.key).await.unwrap());
        assert!(!store.delete(&meta.key).await.unwrap());
        assert!(store.get(&meta.key).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn size_limit_enforced() {
        let store = MemoryBlobStore::new().with_max_size(2);
        let err = store
            .put("documents", "a.pdf", "application/pdf", Bytes::from_static(b"abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::TooLarge { size: 3, limit: 2 }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn invalid_keys_rejected() {
        let store = MemoryBlobStore::new();
        assert!(matches!(
            store.get("../secret").await,
            Err(BlobError::InvalidKey(_))
        ));
    }
}
