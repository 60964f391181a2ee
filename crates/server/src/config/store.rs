use serde::Deserialize;

/// Configuration for the record store backend.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use: `"memory"` or `"postgres"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Connection URL for the `PostgreSQL` backend.
    pub url: Option<String>,
    /// Maximum pool connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Schema holding the Signet tables.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Prefix applied to every table name.
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
    /// SSL mode (`disable`, `prefer`, `require`, `verify-ca`, `verify-full`).
    pub ssl_mode: Option<String>,
    /// Path to a CA certificate for server verification.
    pub ssl_root_cert: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            pool_size: default_pool_size(),
            schema: default_schema(),
            table_prefix: default_table_prefix(),
            ssl_mode: None,
            ssl_root_cert: None,
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_pool_size() -> u32 {
    5
}

fn default_schema() -> String {
    "public".to_owned()
}

fn default_table_prefix() -> String {
    "signet_".to_owned()
}
