use signet_core::{Requester, Role, UserId};

/// The authenticated caller, attached to each protected request.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub username: String,
    /// Role as currently stored, not as recorded in the token.
    pub role: Role,
}

impl CallerIdentity {
    pub fn requester(&self) -> Requester {
        Requester::new(self.user_id, self.role)
    }
}
