use serde::Deserialize;

/// Limits applied to multipart request bodies.
#[derive(Debug, Deserialize)]
pub struct UploadConfig {
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}
