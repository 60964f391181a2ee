use serde::Deserialize;

/// Configuration for uploaded file storage.
#[derive(Debug, Deserialize)]
pub struct BlobConfig {
    /// Which backend to use: `"memory"` or `"filesystem"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Root directory for the filesystem backend.
    #[serde(default = "default_root")]
    pub root: String,
    /// Largest single file accepted, in bytes. Unlimited when unset.
    pub max_size_bytes: Option<u64>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            root: default_root(),
            max_size_bytes: None,
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_root() -> String {
    "media".to_owned()
}
