use std::sync::Arc;

use signet_blob::{BlobStore, FilesystemBlobStore, MemoryBlobStore};

use crate::config::BlobConfig;
use crate::error::ServerError;

/// Create the file store from the given configuration.
pub async fn create_blob_store(config: &BlobConfig) -> Result<Arc<dyn BlobStore>, ServerError> {
    let store: Arc<dyn BlobStore> = match config.backend.as_str() {
        "memory" => {
            let mut store = MemoryBlobStore::new();
            if let Some(limit) = config.max_size_bytes {
                store = store.with_max_size(limit);
            }
            Arc::new(store)
        }
        "filesystem" => {
            let mut store = FilesystemBlobStore::new(&config.root)
                .await
                .map_err(|e| ServerError::Config(format!("blob filesystem: {e}")))?;
            if let Some(limit) = config.max_size_bytes {
                store = store.with_max_size(limit);
            }
            Arc::new(store)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unsupported blob backend: {other}"
            )));
        }
    };

    tracing::info!(backend = %config.backend, "file store ready");
    Ok(store)
}
