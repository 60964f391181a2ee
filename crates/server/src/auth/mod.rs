pub mod identity;
pub mod jwt;
pub mod middleware;

use std::sync::Arc;

use tracing::debug;

use signet_core::User;
use signet_workflow::{WorkflowEngine, WorkflowError};

use self::identity::CallerIdentity;
use self::jwt::JwtManager;

/// Resolves bearer tokens to callers.
///
/// Tokens carry the user id; the role is re-read from the store on every
/// request so a role change takes effect without reissuing tokens.
pub struct AuthProvider {
    jwt: JwtManager,
    engine: Arc<WorkflowEngine>,
}

impl AuthProvider {
    pub fn new(secret: &str, expiry_seconds: u64, engine: Arc<WorkflowEngine>) -> Self {
        Self {
            jwt: JwtManager::new(secret, expiry_seconds),
            engine,
        }
    }

    /// Issue a token for a registered user.
    pub fn issue_token(&self, user: &User) -> Result<String, String> {
        self.jwt.issue(user)
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.jwt.expiry_seconds()
    }

    /// Validate a token and load the caller it names.
    pub async fn validate(&self, token: &str) -> Result<CallerIdentity, String> {
        let claims = self.jwt.decode(token)?;
        let user = match self.engine.get_user(claims.user_id()).await {
            Ok(user) => user,
            Err(WorkflowError::NotFound(_)) => return Err("unknown user".to_owned()),
            Err(e) => return Err(format!("user lookup failed: {e}")),
        };
        debug!(user_id = %user.id, "caller authenticated");
        Ok(CallerIdentity {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use signet_blob::MemoryBlobStore;
    use signet_core::{NewUser, Role, UserId};
    use signet_store_memory::MemoryWorkflowStore;
    use signet_workflow::WorkflowEngineBuilder;

    use super::*;

    fn provider() -> AuthProvider {
        let engine = WorkflowEngineBuilder::new()
            .store(Arc::new(MemoryWorkflowStore::new()))
            .blobs(Arc::new(MemoryBlobStore::new()))
            .build()
            .unwrap();
        AuthProvider::new("test-secret", 300, Arc::new(engine))
    }

    #[tokio::test]
    async fn token_resolves_to_stored_user() {
        let auth = provider();
        let user = auth
            .engine
            .register_user(NewUser {
                username: "erin".into(),
                email: "erin@example.com".into(),
                role: Role::Signer,
                post: Some("Counsel".into()),
            })
            .await
            .unwrap();

        let token = auth.issue_token(&user).unwrap();
        let identity = auth.validate(&token).await.unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "erin");
        assert_eq!(identity.requester().role, Role::Signer);
    }

    #[tokio::test]
    async fn token_for_unknown_user_rejected() {
        let auth = provider();
        let ghost = User {
            id: UserId::new(404),
            username: "ghost".into(),
            email: "ghost@example.com".into(),
            role: Role::Admin,
            post: None,
            created_at: chrono::Utc::now(),
        };
        let token = auth.issue_token(&ghost).unwrap();
        assert_eq!(auth.validate(&token).await.unwrap_err(), "unknown user");
    }
}
