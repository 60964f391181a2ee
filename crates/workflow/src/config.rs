use serde::{Deserialize, Serialize};

/// Tunables for [`WorkflowEngine`](crate::WorkflowEngine) behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Whether a signer may overwrite a decision already recorded on a
    /// status row. When `false`, deciding a non-pending row fails with
    /// [`WorkflowError::Conflict`](crate::WorkflowError::Conflict).
    pub allow_redecision: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            allow_redecision: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redecision_allowed_by_default() {
        assert!(WorkflowConfig::default().allow_redecision);
    }
}
