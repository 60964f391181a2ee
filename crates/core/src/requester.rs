use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::types::UserId;

/// The authenticated user on whose behalf a workflow operation runs.
///
/// Every engine call receives the requester explicitly; there is no ambient
/// "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: UserId,
    pub role: Role,
}

impl Requester {
    #[must_use]
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
