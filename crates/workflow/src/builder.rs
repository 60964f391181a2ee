use std::sync::Arc;

use signet_blob::BlobStore;
use signet_store::WorkflowStore;

use crate::config::WorkflowConfig;
use crate::engine::WorkflowEngine;
use crate::error::WorkflowError;

/// Fluent builder for constructing a [`WorkflowEngine`].
///
/// A [`WorkflowStore`] and a [`BlobStore`] must be supplied; the
/// configuration defaults to [`WorkflowConfig::default`].
#[derive(Default)]
pub struct WorkflowEngineBuilder {
    store: Option<Arc<dyn WorkflowStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
    config: WorkflowConfig,
}

impl WorkflowEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record store implementation.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the blob store used for documents and signature images.
    #[must_use]
    pub fn blobs(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    #[must_use]
    pub fn config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for toggling [`WorkflowConfig::allow_redecision`].
    #[must_use]
    pub fn allow_redecision(mut self, allow: bool) -> Self {
        self.config.allow_redecision = allow;
        self
    }

    /// Consume the builder and produce an engine.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Configuration`] if a store is missing.
    pub fn build(self) -> Result<WorkflowEngine, WorkflowError> {
        let store = self
            .store
            .ok_or_else(|| WorkflowError::Configuration("workflow store is required".into()))?;

        let blobs = self
            .blobs
            .ok_or_else(|| WorkflowError::Configuration("blob store is required".into()))?;

        Ok(WorkflowEngine {
            store,
            blobs,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use signet_blob::MemoryBlobStore;
    use signet_store_memory::MemoryWorkflowStore;

    use super::*;

    #[test]
    fn build_requires_store() {
        let err = WorkflowEngineBuilder::new()
            .blobs(Arc::new(MemoryBlobStore::new()))
            .build()
            .err()
            .expect("missing store must fail");
        assert!(matches!(err, WorkflowError::Configuration(_)));
    }

    #[test]
    fn build_requires_blobs() {
        let err = WorkflowEngineBuilder::new()
            .store(Arc::new(MemoryWorkflowStore::new()))
            .build()
            .err()
            .expect("missing blob store must fail");
        assert!(matches!(err, WorkflowError::Configuration(_)));
    }

    #[test]
    fn config_is_carried() {
        let engine = WorkflowEngineBuilder::new()
            .store(Arc::new(MemoryWorkflowStore::new()))
            .blobs(Arc::new(MemoryBlobStore::new()))
            .allow_redecision(false)
            .build()
            .unwrap();
        assert!(!engine.config().allow_redecision);
    }
}
