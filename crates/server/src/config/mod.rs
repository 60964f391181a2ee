mod auth;
mod blob;
mod server;
mod store;
mod uploads;

#[cfg(test)]
mod tests;

pub use auth::*;
pub use blob::*;
pub use server::*;
pub use store::*;
pub use uploads::*;

use serde::Deserialize;
use signet_workflow::WorkflowConfig;

/// Top-level configuration for the Signet server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct SignetConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// File storage backend configuration.
    #[serde(default)]
    pub blob: BlobConfig,
    /// Token issuance and validation.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Workflow engine tunables.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Request body limits for multipart uploads.
    #[serde(default)]
    pub uploads: UploadConfig,
}
