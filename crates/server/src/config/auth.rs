use serde::Deserialize;

/// Bearer token settings.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens.
    ///
    /// The `SIGNET_JWT_SECRET` environment variable takes precedence. If
    /// neither is set, a random secret is generated on startup and tokens
    /// will not survive a restart.
    pub jwt_secret: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiry_seconds: default_jwt_expiry(),
        }
    }
}

fn default_jwt_expiry() -> u64 {
    3600
}
