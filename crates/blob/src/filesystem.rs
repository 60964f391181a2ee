use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::BlobError;
use crate::key;
use crate::store::BlobStore;
use crate::types::{BlobMetadata, ResolvedBlob};

const DATA_DIR: &str = "data";
const META_DIR: &str = "meta";

/// Blob store writing each blob as a file under a root directory.
///
/// Content lives at `<root>/data/<key>`, metadata in a JSON sidecar at
/// `<root>/meta/<key>.json`.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
    max_size: Option<u64>,
}

fn storage(e: &std::io::Error) -> BlobError {
    BlobError::Storage(e.to_string())
}

impl FilesystemBlobStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::Storage`] if the directory cannot be created.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| storage(&e))?;
        Ok(Self {
            root,
            max_size: None,
        })
    }

    #[must_use]
    pub fn with_max_size(mut self, limit: u64) -> Self {
        self.max_size = Some(limit);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, key: &str) -> Result<(PathBuf, PathBuf), BlobError> {
        key::validate(key)?;
        let data = self.root.join(DATA_DIR).join(key);
        let meta = self.root.join(META_DIR).join(format!("{key}.json"));
        Ok((data, meta))
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(
        &self,
        namespace: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<BlobMetadata, BlobError> {
        key::check_size(&data, self.max_size)?;
        let key = key::generate(namespace, filename)?;
        let (data_path, meta_path) = self.paths(&key)?;
        let metadata = key::metadata(key, filename, content_type, &data);

        for path in [&data_path, &meta_path] {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| storage(&e))?;
            }
        }
        let sidecar =
            serde_json::to_vec(&metadata).map_err(|e| BlobError::Storage(e.to_string()))?;
        tokio::fs::write(&data_path, &data)
            .await
            .map_err(|e| storage(&e))?;
        tokio::fs::write(&meta_path, sidecar)
            .await
            .map_err(|e| storage(&e))?;

        debug!(key = %metadata.key, size = metadata.size_bytes, "blob written");
        Ok(metadata)
    }

    async fn get(&self, key: &str) -> Result<Option<ResolvedBlob>, BlobError> {
        let (data_path, meta_path) = self.paths(key)?;
        let data = match tokio::fs::read(&data_path).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage(&e)),
        };
        let sidecar = match tokio::fs::read(&meta_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage(&e)),
        };
        let metadata: BlobMetadata =
            serde_json::from_slice(&sidecar).map_err(|e| BlobError::Storage(e.to_string()))?;
        Ok(Some(ResolvedBlob { metadata, data }))
    }

    async fn delete(&self, key: &str) -> Result<bool, BlobError> {
        let (data_path, meta_path) = self.paths(key)?;
        let existed = match tokio::fs::remove_file(&data_path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(storage(&e)),
        };
        match tokio::fs::remove_file(&meta_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(storage(&e)),
        }
        debug!(key, existed, "blob deleted");
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("signet-blob-{}", uuid::Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn put_get_delete_roundtrip_on_disk() {
        let dir = scratch_dir();
        let store = FilesystemBlobStore::new(&dir).await.unwrap();

        let meta = store
            .put(
                "documents/with_signatures",
                "contract.pdf",
                "application/pdf",
                Bytes::from_static(b"%PDF-1.7"),
            )
            .await
            .unwrap();
        assert!(dir.join(DATA_DIR).join(&meta.key).is_file());

        let blob = store.get(&meta.key).await.unwrap().expect("blob exists");
        assert_eq!(blob.metadata, meta);
        assert_eq!(blob.data, Bytes::from_static(b"%PDF-1.7"));

        assert!(store.delete(&meta.key).await.unwrap());
        assert!(store.get(&meta.key).await.unwrap().is_none());
        assert!(!store.delete(&meta.key).await.unwrap());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_key_is_none() {
        let dir = scratch_dir();
        let store = FilesystemBlobStore::new(&dir).await.unwrap();
        assert!(store.get("signatures/missing.png").await.unwrap().is_none());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let dir = scratch_dir();
        let store = FilesystemBlobStore::new(&dir).await.unwrap();
        assert!(matches!(
            store.get("../outside").await,
            Err(BlobError::InvalidKey(_))
        ));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
