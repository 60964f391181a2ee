//! Persistent records shared by the store backends and the workflow engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::status::{ApprovalStatus, Decision};
use crate::types::{DocumentId, LogId, RoundId, SignatureId, StatusId, UserId};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Job title or position shown next to the signer's name.
    pub post: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to register a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub post: Option<String>,
}

/// An uploaded source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Blob key of the stored file.
    pub file: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub file: String,
    pub owner_id: UserId,
}

/// A signer's current signature image. At most one exists per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Signature {
    pub id: SignatureId,
    pub user_id: UserId,
    /// Blob key of the stored image.
    pub file: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A signing round: one edited snapshot of a document plus the fixed set of
/// signatures requested against it.
///
/// Everything except `draft` is immutable after creation, and `draft` only
/// ever moves from `true` to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Round {
    pub id: RoundId,
    pub document_id: DocumentId,
    /// Blob key of the edited file.
    pub edited_file: String,
    /// The user who opened the round.
    pub requester_id: UserId,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to open a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRound {
    pub document_id: DocumentId,
    pub edited_file: String,
    pub requester_id: UserId,
    pub draft: bool,
}

/// One signer's verdict within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusRow {
    pub id: StatusId,
    pub round_id: RoundId,
    pub signature_id: SignatureId,
    pub status: ApprovalStatus,
    pub updated_at: DateTime<Utc>,
}

/// A status row joined with the signature and the signer who owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusDetail {
    pub status_id: StatusId,
    pub signature_id: SignatureId,
    pub signer_id: UserId,
    pub signer_name: String,
    pub status: ApprovalStatus,
    pub updated_at: DateTime<Utc>,
}

/// An append-only record of a signer's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VerificationLog {
    pub id: LogId,
    pub document_id: DocumentId,
    pub round_id: RoundId,
    pub status_id: StatusId,
    pub signer_id: UserId,
    pub action: Decision,
    pub timestamp: DateTime<Utc>,
}
