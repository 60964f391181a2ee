use thiserror::Error;

/// Errors produced when parsing domain literals received from callers or storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid action '{0}'. Must be 'approve' or 'reject'")]
    Decision(String),

    #[error("invalid approval status: {0}")]
    Status(String),

    #[error("invalid role: {0}")]
    Role(String),
}
