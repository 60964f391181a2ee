use async_trait::async_trait;

use signet_core::{
    ApprovalStatus, Decision, Document, DocumentId, NewDocument, NewRound, NewUser, Round,
    RoundId, RoundTally, Signature, SignatureId, StatusDetail, StatusId, StatusRow, User, UserId,
    VerificationLog,
};

use crate::error::StoreError;
use crate::filter::RoundFilter;

/// Result of registering or replacing a user's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureUpsert {
    pub signature: Signature,
    /// Blob key of the file that was overwritten, if the user already had one.
    pub replaced_file: Option<String>,
}

/// Result of a conditional draft-to-final transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeResult {
    Finalized(Round),
    /// The round exists, belongs to the requester, and is already final.
    AlreadyFinal,
    /// The round does not exist or belongs to someone else.
    NotFound,
}

/// Result of a conditional decision on a status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionResult {
    Applied {
        status: StatusRow,
        log: VerificationLog,
    },
    /// Re-decision was disallowed and the row already carries this status.
    AlreadyDecided(ApprovalStatus),
    NotFound,
}

/// Trait for persisting workflow state.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Each method is atomic: it either fully applies or leaves no trace.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Register a user. Fails with [`StoreError::Conflict`] on a duplicate username.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn count_users(&self) -> Result<u64, StoreError>;

    /// Store a document record. The owner must exist.
    async fn create_document(&self, document: NewDocument) -> Result<Document, StoreError>;

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite the single signature owned by `user_id`.
    ///
    /// Must be a true upsert keyed on the owner so that concurrent first
    /// uploads cannot produce two rows.
    async fn upsert_signature(
        &self,
        user_id: UserId,
        file: &str,
    ) -> Result<SignatureUpsert, StoreError>;

    async fn get_signature(&self, id: SignatureId) -> Result<Option<Signature>, StoreError>;

    /// List signatures newest-first, optionally restricted to one owner.
    async fn list_signatures(&self, owner: Option<UserId>) -> Result<Vec<Signature>, StoreError>;

    /// Create a round and one pending status row per signature in a single
    /// transaction.
    ///
    /// Returns [`StoreError::MissingReference`] without writing anything if
    /// the document or any signature does not exist.
    async fn create_round(
        &self,
        round: NewRound,
        signatures: &[SignatureId],
    ) -> Result<(Round, Vec<StatusRow>), StoreError>;

    async fn get_round(&self, id: RoundId) -> Result<Option<Round>, StoreError>;

    /// Flip `draft` to `false` if the round is owned by `requester` and is
    /// still a draft.
    async fn finalize_round(
        &self,
        id: RoundId,
        requester: UserId,
    ) -> Result<FinalizeResult, StoreError>;

    /// Rounds matching `filter` with their status counts, newest-first.
    async fn round_tallies(&self, filter: &RoundFilter) -> Result<Vec<RoundTally>, StoreError>;

    /// Non-draft rounds having at least one status row for `signature`,
    /// each listed once, newest-first.
    async fn list_rounds_for_signature(
        &self,
        signature: SignatureId,
    ) -> Result<Vec<Round>, StoreError>;

    /// Status rows of a round joined with their signer, in creation order.
    async fn status_details(&self, round: RoundId) -> Result<Vec<StatusDetail>, StoreError>;

    async fn get_status(&self, id: StatusId) -> Result<Option<StatusRow>, StoreError>;

    /// Set the status row to the decision's outcome and append a
    /// verification log entry, atomically.
    ///
    /// When `allow_redecision` is `false` only pending rows are updated.
    async fn apply_decision(
        &self,
        id: StatusId,
        decision: Decision,
        signer: UserId,
        allow_redecision: bool,
    ) -> Result<DecisionResult, StoreError>;

    /// Verification log entries for a round, oldest first.
    async fn decision_log(&self, round: RoundId) -> Result<Vec<VerificationLog>, StoreError>;
}
