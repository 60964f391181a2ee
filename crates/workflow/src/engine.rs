use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use signet_blob::BlobStore;
use signet_core::{
    Completion, Decision, NewRound, Requester, Round, RoundId, RoundTally, Signature,
    SignatureId, StatusId, VerificationLog,
};
use signet_store::{DecisionResult, FinalizeResult, RoundFilter, StoreError, WorkflowStore};

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::views::{AssignedSignature, DecisionOutcome, RoundStatusReport, StartRound, StartedRound};

/// Blob namespace for edited round files.
pub(crate) const ROUND_FILES: &str = "documents/with_signatures";

/// The approval workflow engine.
///
/// Construct with [`WorkflowEngineBuilder`](crate::WorkflowEngineBuilder).
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct WorkflowEngine {
    pub(crate) store: Arc<dyn WorkflowStore>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) config: WorkflowConfig,
}

impl WorkflowEngine {
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn WorkflowStore> {
        &self.store
    }

    /// Remove a blob written earlier in a failed operation.
    pub(crate) async fn discard_blob(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            warn!(key, error = %e, "failed to remove orphaned blob");
        }
    }

    /// Open a signing round over an edited copy of a document.
    ///
    /// At least one signature is required. The document and every requested
    /// signature are checked before anything is written; the round and its pending status rows are then
    /// created in one store transaction.
    #[instrument(
        name = "workflow.start_signing_round",
        skip_all,
        fields(document_id = %request.document_id, requester = %requester.user_id, draft = request.draft)
    )]
    pub async fn start_signing_round(
        &self,
        request: StartRound,
        requester: Requester,
    ) -> Result<StartedRound, WorkflowError> {
        if request.edited_file.data.is_empty() {
            return Err(WorkflowError::InvalidArgument("file is empty".into()));
        }

        let mut seen = HashSet::new();
        let ids: Vec<SignatureId> = request
            .signature_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Err(WorkflowError::InvalidArgument(
                "signature_id is required".into(),
            ));
        }

        if self.store.get_document(request.document_id).await?.is_none() {
            return Err(WorkflowError::NotFound(format!(
                "document {} not found",
                request.document_id
            )));
        }

        let mut signatures: HashMap<SignatureId, Signature> = HashMap::with_capacity(ids.len());
        for id in &ids {
            let signature = self
                .store
                .get_signature(*id)
                .await?
                .ok_or_else(|| WorkflowError::NotFound(format!("signature {id} not found")))?;
            signatures.insert(*id, signature);
        }

        let upload = &request.edited_file;
        let blob = self
            .blobs
            .put(
                ROUND_FILES,
                &upload.filename,
                &upload.content_type,
                upload.data.clone(),
            )
            .await?;

        let new_round = NewRound {
            document_id: request.document_id,
            edited_file: blob.key.clone(),
            requester_id: requester.user_id,
            draft: request.draft,
        };
        let (round, statuses) = match self.store.create_round(new_round, &ids).await {
            Ok(created) => created,
            Err(e) => {
                self.discard_blob(&blob.key).await;
                return Err(match e {
                    StoreError::MissingReference(what) => {
                        WorkflowError::NotFound(format!("{what} not found"))
                    }
                    other => other.into(),
                });
            }
        };

        let assigned = statuses
            .into_iter()
            .map(|status| AssignedSignature {
                signature_file: signatures
                    .get(&status.signature_id)
                    .map(|s| s.file.clone())
                    .unwrap_or_default(),
                status,
            })
            .collect::<Vec<_>>();

        info!(
            round_id = %round.id,
            signatures = assigned.len(),
            "signing round started"
        );
        Ok(StartedRound { round, assigned })
    }

    /// Move a draft round owned by `requester` to final.
    ///
    /// A missing round and one owned by someone else are both reported as
    /// [`WorkflowError::NotFound`].
    #[instrument(name = "workflow.promote_to_final", skip_all, fields(%round_id, requester = %requester.user_id))]
    pub async fn promote_to_final(
        &self,
        round_id: RoundId,
        requester: Requester,
    ) -> Result<Round, WorkflowError> {
        match self
            .store
            .finalize_round(round_id, requester.user_id)
            .await?
        {
            FinalizeResult::Finalized(round) => {
                info!("round promoted to final");
                Ok(round)
            }
            FinalizeResult::AlreadyFinal => Err(WorkflowError::Conflict(
                "document signature is already final".into(),
            )),
            FinalizeResult::NotFound => Err(WorkflowError::NotFound(format!(
                "document signature {round_id} not found"
            ))),
        }
    }

    /// Record a signer's approve/reject decision on a status row.
    ///
    /// Checks run in order: the row exists, the requester owns the row's
    /// signature, then the action literal parses.
    #[instrument(name = "workflow.record_decision", skip_all, fields(%status_id, requester = %requester.user_id, action = %action))]
    pub async fn record_decision(
        &self,
        status_id: StatusId,
        action: &str,
        requester: Requester,
    ) -> Result<DecisionOutcome, WorkflowError> {
        let not_found = || WorkflowError::NotFound(format!("status {status_id} not found"));

        let status = self.store.get_status(status_id).await?.ok_or_else(not_found)?;
        let signature = self
            .store
            .get_signature(status.signature_id)
            .await?
            .ok_or_else(not_found)?;
        if signature.user_id != requester.user_id {
            return Err(WorkflowError::PermissionDenied(
                "you do not have permission to update this status".into(),
            ));
        }

        let decision: Decision = action
            .parse()
            .map_err(|e: signet_core::ParseError| WorkflowError::InvalidArgument(e.to_string()))?;

        match self
            .store
            .apply_decision(
                status_id,
                decision,
                requester.user_id,
                self.config.allow_redecision,
            )
            .await?
        {
            DecisionResult::Applied { status, log } => {
                info!(round_id = %status.round_id, status = %status.status, "decision recorded");
                Ok(DecisionOutcome { status, log })
            }
            DecisionResult::AlreadyDecided(current) => Err(WorkflowError::Conflict(format!(
                "status is already {current}"
            ))),
            DecisionResult::NotFound => Err(not_found()),
        }
    }

    /// Aggregate completion of one round.
    pub async fn compute_completion(&self, round_id: RoundId) -> Result<Completion, WorkflowError> {
        let tallies = self
            .store
            .round_tallies(&RoundFilter::by_ids([round_id]))
            .await?;
        tallies
            .first()
            .map(RoundTally::completion)
            .ok_or_else(|| {
                WorkflowError::NotFound(format!("document signature {round_id} not found"))
            })
    }

    /// Completion of several rounds, in the order requested.
    ///
    /// Fails with [`WorkflowError::NotFound`] naming the first unknown id.
    pub async fn compute_completions(
        &self,
        round_ids: &[RoundId],
    ) -> Result<Vec<Completion>, WorkflowError> {
        let tallies = self
            .store
            .round_tallies(&RoundFilter::by_ids(round_ids.iter().copied()))
            .await?;
        let by_id: HashMap<RoundId, Completion> = tallies
            .iter()
            .map(|t| (t.round.id, t.completion()))
            .collect();
        round_ids
            .iter()
            .map(|id| {
                by_id.get(id).copied().ok_or_else(|| {
                    WorkflowError::NotFound(format!("document signature {id} not found"))
                })
            })
            .collect()
    }

    /// Final rounds that requested `signature_id`, newest first.
    pub async fn list_rounds_for_signature(
        &self,
        signature_id: SignatureId,
    ) -> Result<Vec<Round>, WorkflowError> {
        if self.store.get_signature(signature_id).await?.is_none() {
            return Err(WorkflowError::NotFound(format!(
                "signature {signature_id} not found"
            )));
        }
        let rounds = self.store.list_rounds_for_signature(signature_id).await?;
        debug!(%signature_id, count = rounds.len(), "rounds for signature");
        Ok(rounds)
    }

    /// A round with each status row and its signer.
    pub async fn round_status(&self, round_id: RoundId) -> Result<RoundStatusReport, WorkflowError> {
        let round = self.store.get_round(round_id).await?.ok_or_else(|| {
            WorkflowError::NotFound(format!("document signature {round_id} not found"))
        })?;
        let statuses = self.store.status_details(round_id).await?;
        Ok(RoundStatusReport { round, statuses })
    }

    /// Decisions recorded on a round, oldest first.
    pub async fn decision_log(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<VerificationLog>, WorkflowError> {
        if self.store.get_round(round_id).await?.is_none() {
            return Err(WorkflowError::NotFound(format!(
                "document signature {round_id} not found"
            )));
        }
        Ok(self.store.decision_log(round_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use signet_blob::MemoryBlobStore;
    use signet_core::{ApprovalStatus, DocumentId, NewDocument, NewUser, Role};
    use signet_store_memory::MemoryWorkflowStore;

    use super::*;
    use crate::WorkflowEngineBuilder;
    use crate::views::Upload;

    struct Fixture {
        engine: WorkflowEngine,
        blobs: Arc<MemoryBlobStore>,
        owner: Requester,
        signer: Requester,
        document: DocumentId,
        signature: SignatureId,
    }

    async fn fixture(allow_redecision: bool) -> Fixture {
        let store = Arc::new(MemoryWorkflowStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let engine = WorkflowEngineBuilder::new()
            .store(store.clone())
            .blobs(blobs.clone())
            .allow_redecision(allow_redecision)
            .build()
            .unwrap();

        let owner = store
            .create_user(NewUser {
                username: "owner".into(),
                email: "owner@example.com".into(),
                role: Role::Admin,
                post: None,
            })
            .await
            .unwrap();
        let signer = store
            .create_user(NewUser {
                username: "signer".into(),
                email: "signer@example.com".into(),
                role: Role::Signer,
                post: Some("Director".into()),
            })
            .await
            .unwrap();
        let document = store
            .create_document(NewDocument {
                title: "Contract".into(),
                file: "documents/contract.pdf".into(),
                owner_id: owner.id,
            })
            .await
            .unwrap();
        let signature = store
            .upsert_signature(signer.id, "signatures/s.png")
            .await
            .unwrap()
            .signature;

        Fixture {
            engine,
            blobs,
            owner: Requester::new(owner.id, owner.role),
            signer: Requester::new(signer.id, signer.role),
            document: document.id,
            signature: signature.id,
        }
    }

    fn request(f: &Fixture, ids: Vec<SignatureId>, draft: bool) -> StartRound {
        StartRound {
            document_id: f.document,
            signature_ids: ids,
            edited_file: Upload::new("edited.pdf", "application/pdf", Bytes::from_static(b"pdf")),
            draft,
        }
    }

    #[tokio::test]
    async fn duplicate_ids_collapse() {
        let f = fixture(true).await;
        let started = f
            .engine
            .start_signing_round(request(&f, vec![f.signature, f.signature], false), f.owner)
            .await
            .unwrap();
        assert_eq!(started.assigned.len(), 1);
        assert_eq!(started.assigned[0].signature_file, "signatures/s.png");
        assert!(started.round.edited_file.starts_with(ROUND_FILES));
    }

    #[tokio::test]
    async fn missing_signature_writes_nothing() {
        let f = fixture(true).await;
        let err = f
            .engine
            .start_signing_round(
                request(&f, vec![f.signature, SignatureId::new(999)], false),
                f.owner,
            )
            .await
            .unwrap_err();
        match err {
            WorkflowError::NotFound(msg) => assert!(msg.contains("999"), "{msg}"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(f.blobs.is_empty(), "no blob written on validation failure");
    }

    #[tokio::test]
    async fn empty_file_rejected() {
        let f = fixture(true).await;
        let mut req = request(&f, vec![f.signature], false);
        req.edited_file.data = Bytes::new();
        let err = f.engine.start_signing_round(req, f.owner).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn empty_signature_list_rejected() {
        let f = fixture(true).await;
        let err = f
            .engine
            .start_signing_round(request(&f, vec![], false), f.owner)
            .await
            .unwrap_err();
        match err {
            WorkflowError::InvalidArgument(msg) => assert_eq!(msg, "signature_id is required"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        assert!(f.blobs.is_empty(), "no blob written for an empty list");
        let rounds = f
            .engine
            .store()
            .round_tallies(&RoundFilter {
                include_drafts: true,
                ..RoundFilter::default()
            })
            .await
            .unwrap();
        assert!(rounds.is_empty(), "no round created");
    }

    #[tokio::test]
    async fn strict_mode_refuses_redecision() {
        let f = fixture(false).await;
        let started = f
            .engine
            .start_signing_round(request(&f, vec![f.signature], false), f.owner)
            .await
            .unwrap();
        let status_id = started.assigned[0].status.id;

        f.engine
            .record_decision(status_id, "approve", f.signer)
            .await
            .unwrap();
        let err = f
            .engine
            .record_decision(status_id, "reject", f.signer)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
        let report = f.engine.round_status(started.round.id).await.unwrap();
        assert_eq!(report.statuses[0].status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn permissive_mode_overwrites() {
        let f = fixture(true).await;
        let started = f
            .engine
            .start_signing_round(request(&f, vec![f.signature], false), f.owner)
            .await
            .unwrap();
        let status_id = started.assigned[0].status.id;

        f.engine
            .record_decision(status_id, "approve", f.signer)
            .await
            .unwrap();
        let outcome = f
            .engine
            .record_decision(status_id, "reject", f.signer)
            .await
            .unwrap();
        assert_eq!(outcome.status.status, ApprovalStatus::Rejected);
        assert_eq!(outcome.log.action, Decision::Reject);
        assert_eq!(
            f.engine.decision_log(started.round.id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn batch_completion_names_missing_round() {
        let f = fixture(true).await;
        let started = f
            .engine
            .start_signing_round(request(&f, vec![f.signature], false), f.owner)
            .await
            .unwrap();
        let ok = f
            .engine
            .compute_completions(&[started.round.id])
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].pending, 1);

        let err = f
            .engine
            .compute_completions(&[started.round.id, RoundId::new(404)])
            .await
            .unwrap_err();
        match err {
            WorkflowError::NotFound(msg) => assert!(msg.contains("404")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_targets_are_not_found() {
        let f = fixture(true).await;
        assert!(matches!(
            f.engine.round_status(RoundId::new(1_000)).await,
            Err(WorkflowError::NotFound(_))
        ));
        assert!(matches!(
            f.engine.decision_log(RoundId::new(1_000)).await,
            Err(WorkflowError::NotFound(_))
        ));
        assert!(matches!(
            f.engine.list_rounds_for_signature(SignatureId::new(1_000)).await,
            Err(WorkflowError::NotFound(_))
        ));
        assert!(matches!(
            f.engine
                .record_decision(StatusId::new(1_000), "approve", f.signer)
                .await,
            Err(WorkflowError::NotFound(_))
        ));
    }
}
