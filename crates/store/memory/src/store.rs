use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use signet_core::{
    ApprovalStatus, Decision, Document, DocumentId, LogId, NewDocument, NewRound, NewUser, Round,
    RoundId, RoundTally, Signature, SignatureId, StatusDetail, StatusId, StatusRow, User, UserId,
    VerificationLog,
};
use signet_store::error::StoreError;
use signet_store::filter::RoundFilter;
use signet_store::store::{DecisionResult, FinalizeResult, SignatureUpsert, WorkflowStore};

/// All tables guarded by one lock, so every trait call is a transaction.
#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    documents: BTreeMap<DocumentId, Document>,
    signatures: BTreeMap<SignatureId, Signature>,
    rounds: BTreeMap<RoundId, Round>,
    statuses: BTreeMap<StatusId, StatusRow>,
    logs: Vec<VerificationLog>,
}

impl Tables {
    /// IDs are drawn from one sequence shared by all tables.
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn tally(&self, round: &Round) -> RoundTally {
        let mut tally = RoundTally {
            round: round.clone(),
            total: 0,
            approved: 0,
            rejected: 0,
            pending: 0,
        };
        for row in self.statuses.values().filter(|s| s.round_id == round.id) {
            tally.total += 1;
            match row.status {
                ApprovalStatus::Pending => tally.pending += 1,
                ApprovalStatus::Approved => tally.approved += 1,
                ApprovalStatus::Rejected => tally.rejected += 1,
            }
        }
        tally
    }
}

/// Newest-first ordering shared by round listings.
fn newest_first(rounds: &mut [Round]) {
    rounds.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// In-memory [`WorkflowStore`]. Suitable for development and testing.
///
/// A single [`RwLock`] guards every table; each method takes the lock once,
/// which gives the same all-or-nothing behaviour as a database transaction.
#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    tables: RwLock<Tables>,
}

impl MemoryWorkflowStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write();
        if t.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        let id = UserId::new(t.allocate());
        let record = User {
            id,
            username: user.username,
            email: user.email,
            role: user.role,
            post: user.post,
            created_at: Utc::now(),
        };
        t.users.insert(id, record.clone());
        Ok(record)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().users.len() as u64)
    }

    async fn create_document(&self, document: NewDocument) -> Result<Document, StoreError> {
        let mut t = self.tables.write();
        if !t.users.contains_key(&document.owner_id) {
            return Err(StoreError::MissingReference(format!(
                "user {}",
                document.owner_id
            )));
        }
        let id = DocumentId::new(t.allocate());
        let now = Utc::now();
        let record = Document {
            id,
            title: document.title,
            file: document.file,
            owner_id: document.owner_id,
            created_at: now,
            updated_at: now,
        };
        t.documents.insert(id, record.clone());
        Ok(record)
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.tables.read().documents.get(&id).cloned())
    }

    async fn upsert_signature(
        &self,
        user_id: UserId,
        file: &str,
    ) -> Result<SignatureUpsert, StoreError> {
        let mut t = self.tables.write();
        if !t.users.contains_key(&user_id) {
            return Err(StoreError::MissingReference(format!("user {user_id}")));
        }
        let now = Utc::now();

        if let Some(existing) = t.signatures.values_mut().find(|s| s.user_id == user_id) {
            let replaced = std::mem::replace(&mut existing.file, file.to_owned());
            existing.updated_at = now;
            return Ok(SignatureUpsert {
                signature: existing.clone(),
                replaced_file: Some(replaced),
            });
        }

        let id = SignatureId::new(t.allocate());
        let signature = Signature {
            id,
            user_id,
            file: file.to_owned(),
            created_at: now,
            updated_at: now,
        };
        t.signatures.insert(id, signature.clone());
        Ok(SignatureUpsert {
            signature,
            replaced_file: None,
        })
    }

    async fn get_signature(&self, id: SignatureId) -> Result<Option<Signature>, StoreError> {
        Ok(self.tables.read().signatures.get(&id).cloned())
    }

    async fn list_signatures(&self, owner: Option<UserId>) -> Result<Vec<Signature>, StoreError> {
        let t = self.tables.read();
        let mut list: Vec<Signature> = t
            .signatures
            .values()
            .filter(|s| owner.is_none_or(|o| s.user_id == o))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn create_round(
        &self,
        round: NewRound,
        signatures: &[SignatureId],
    ) -> Result<(Round, Vec<StatusRow>), StoreError> {
        let mut t = self.tables.write();

        // Validate every reference before touching any table.
        if !t.documents.contains_key(&round.document_id) {
            return Err(StoreError::MissingReference(format!(
                "document {}",
                round.document_id
            )));
        }
        if !t.users.contains_key(&round.requester_id) {
            return Err(StoreError::MissingReference(format!(
                "user {}",
                round.requester_id
            )));
        }
        if let Some(missing) = signatures.iter().find(|id| !t.signatures.contains_key(*id)) {
            return Err(StoreError::MissingReference(format!("signature {missing}")));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = signatures.iter().find(|id| !seen.insert(**id)) {
            return Err(StoreError::Conflict(format!(
                "signature {dup} listed twice in one round"
            )));
        }

        let now = Utc::now();
        let record = Round {
            id: RoundId::new(t.allocate()),
            document_id: round.document_id,
            edited_file: round.edited_file,
            requester_id: round.requester_id,
            draft: round.draft,
            created_at: now,
        };
        t.rounds.insert(record.id, record.clone());

        let mut rows = Vec::with_capacity(signatures.len());
        for signature_id in signatures {
            let row = StatusRow {
                id: StatusId::new(t.allocate()),
                round_id: record.id,
                signature_id: *signature_id,
                status: ApprovalStatus::Pending,
                updated_at: now,
            };
            t.statuses.insert(row.id, row.clone());
            rows.push(row);
        }

        Ok((record, rows))
    }

    async fn get_round(&self, id: RoundId) -> Result<Option<Round>, StoreError> {
        Ok(self.tables.read().rounds.get(&id).cloned())
    }

    async fn finalize_round(
        &self,
        id: RoundId,
        requester: UserId,
    ) -> Result<FinalizeResult, StoreError> {
        let mut t = self.tables.write();
        let Some(round) = t
            .rounds
            .get_mut(&id)
            .filter(|r| r.requester_id == requester)
        else {
            return Ok(FinalizeResult::NotFound);
        };
        if !round.draft {
            return Ok(FinalizeResult::AlreadyFinal);
        }
        round.draft = false;
        Ok(FinalizeResult::Finalized(round.clone()))
    }

    async fn round_tallies(&self, filter: &RoundFilter) -> Result<Vec<RoundTally>, StoreError> {
        let t = self.tables.read();
        let mut rounds: Vec<Round> = t
            .rounds
            .values()
            .filter(|r| filter.matches(r.id, r.requester_id, r.draft))
            .cloned()
            .collect();
        newest_first(&mut rounds);
        Ok(rounds.iter().map(|r| t.tally(r)).collect())
    }

    async fn list_rounds_for_signature(
        &self,
        signature: SignatureId,
    ) -> Result<Vec<Round>, StoreError> {
        let t = self.tables.read();
        let round_ids: HashSet<RoundId> = t
            .statuses
            .values()
            .filter(|s| s.signature_id == signature)
            .map(|s| s.round_id)
            .collect();
        let mut rounds: Vec<Round> = round_ids
            .iter()
            .filter_map(|id| t.rounds.get(id))
            .filter(|r| !r.draft)
            .cloned()
            .collect();
        newest_first(&mut rounds);
        Ok(rounds)
    }

    async fn status_details(&self, round: RoundId) -> Result<Vec<StatusDetail>, StoreError> {
        let t = self.tables.read();
        let mut details = Vec::new();
        for row in t.statuses.values().filter(|s| s.round_id == round) {
            let signature = t.signatures.get(&row.signature_id).ok_or_else(|| {
                StoreError::Backend(format!("dangling signature {}", row.signature_id))
            })?;
            let signer = t.users.get(&signature.user_id).ok_or_else(|| {
                StoreError::Backend(format!("dangling user {}", signature.user_id))
            })?;
            details.push(StatusDetail {
                status_id: row.id,
                signature_id: row.signature_id,
                signer_id: signer.id,
                signer_name: signer.username.clone(),
                status: row.status,
                updated_at: row.updated_at,
            });
        }
        Ok(details)
    }

    async fn get_status(&self, id: StatusId) -> Result<Option<StatusRow>, StoreError> {
        Ok(self.tables.read().statuses.get(&id).cloned())
    }

    async fn apply_decision(
        &self,
        id: StatusId,
        decision: Decision,
        signer: UserId,
        allow_redecision: bool,
    ) -> Result<DecisionResult, StoreError> {
        let mut t = self.tables.write();
        let Some(current) = t.statuses.get(&id).cloned() else {
            return Ok(DecisionResult::NotFound);
        };
        if !allow_redecision && current.status.is_decided() {
            return Ok(DecisionResult::AlreadyDecided(current.status));
        }
        let document_id = t
            .rounds
            .get(&current.round_id)
            .map(|r| r.document_id)
            .ok_or_else(|| StoreError::Backend(format!("dangling round {}", current.round_id)))?;

        let now = Utc::now();
        let log_id = LogId::new(t.allocate());
        let Some(row) = t.statuses.get_mut(&id) else {
            return Ok(DecisionResult::NotFound);
        };
        row.status = decision.outcome();
        row.updated_at = now;
        let status = row.clone();

        let log = VerificationLog {
            id: log_id,
            document_id,
            round_id: status.round_id,
            status_id: id,
            signer_id: signer,
            action: decision,
            timestamp: now,
        };
        t.logs.push(log.clone());

        Ok(DecisionResult::Applied { status, log })
    }

    async fn decision_log(&self, round: RoundId) -> Result<Vec<VerificationLog>, StoreError> {
        Ok(self
            .tables
            .read()
            .logs
            .iter()
            .filter(|l| l.round_id == round)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use signet_core::Role;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryWorkflowStore::new();
        signet_store::testing::run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn ids_are_unique_across_tables() {
        let store = MemoryWorkflowStore::new();
        let user = store
            .create_user(NewUser {
                username: "u".into(),
                email: "u@example.com".into(),
                role: Role::Signer,
                post: None,
            })
            .await
            .unwrap();
        let sig = store.upsert_signature(user.id, "s.png").await.unwrap();
        assert_ne!(user.id.get(), sig.signature.id.get());
    }

    #[tokio::test]
    async fn duplicate_signature_in_round_is_rejected() {
        let store = MemoryWorkflowStore::new();
        let user = store
            .create_user(NewUser {
                username: "dup".into(),
                email: "dup@example.com".into(),
                role: Role::Signer,
                post: None,
            })
            .await
            .unwrap();
        let sig = store.upsert_signature(user.id, "s.png").await.unwrap();
        let doc = store
            .create_document(NewDocument {
                title: "d".into(),
                file: "d.pdf".into(),
                owner_id: user.id,
            })
            .await
            .unwrap();
        let result = store
            .create_round(
                NewRound {
                    document_id: doc.id,
                    edited_file: "e.pdf".into(),
                    requester_id: user.id,
                    draft: true,
                },
                &[sig.signature.id, sig.signature.id],
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(store.tables.read().rounds.is_empty());
    }
}
