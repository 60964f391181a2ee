use std::sync::Arc;

use signet_store::WorkflowStore;
use signet_store_memory::MemoryWorkflowStore;
#[cfg(feature = "postgres")]
use signet_store_postgres::{PostgresConfig, PostgresWorkflowStore};

use crate::config::StoreConfig;
use crate::error::ServerError;

/// Create a record store from the given configuration.
///
/// The `PostgreSQL` backend applies its migrations while connecting.
#[allow(clippy::unused_async)]
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn WorkflowStore>, ServerError> {
    let store: Arc<dyn WorkflowStore> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryWorkflowStore::new()),
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.url.as_deref().ok_or_else(|| {
                ServerError::Config("postgres backend requires [store] url".into())
            })?;

            let pg_config = PostgresConfig {
                url: url.to_owned(),
                pool_size: config.pool_size,
                schema: config.schema.clone(),
                table_prefix: config.table_prefix.clone(),
                ssl_mode: config.ssl_mode.clone(),
                ssl_root_cert: config.ssl_root_cert.clone(),
            };

            let store = PostgresWorkflowStore::new(pg_config)
                .await
                .map_err(|e| ServerError::Config(format!("store postgres: {e}")))?;

            Arc::new(store)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unsupported store backend: {other} (is the feature enabled?)"
            )));
        }
    };

    tracing::info!(backend = %config.backend, "record store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_by_default() {
        let store = create_store(&StoreConfig::default()).await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn unknown_backend_rejected() {
        let config = StoreConfig {
            backend: "cassandra".into(),
            ..StoreConfig::default()
        };
        let err = create_store(&config).await.err().unwrap();
        assert!(err.to_string().contains("unsupported store backend: cassandra"));
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn postgres_requires_url() {
        let config = StoreConfig {
            backend: "postgres".into(),
            ..StoreConfig::default()
        };
        let err = create_store(&config).await.err().unwrap();
        assert!(matches!(err, ServerError::Config(ref m) if m.contains("[store] url")));
    }
}
