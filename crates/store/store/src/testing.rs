use signet_core::{
    ApprovalStatus, Decision, DocumentId, NewDocument, NewRound, NewUser, Role, RoundId,
    SignatureId, StatusId, UserId,
};

use crate::error::StoreError;
use crate::filter::RoundFilter;
use crate::store::{DecisionResult, FinalizeResult, WorkflowStore};

async fn user(store: &dyn WorkflowStore, name: &str, role: Role) -> Result<UserId, StoreError> {
    let u = store
        .create_user(NewUser {
            username: name.to_owned(),
            email: format!("{name}@example.com"),
            role,
            post: None,
        })
        .await?;
    Ok(u.id)
}

async fn document(store: &dyn WorkflowStore, owner: UserId) -> Result<DocumentId, StoreError> {
    let d = store
        .create_document(NewDocument {
            title: "Contract".to_owned(),
            file: "documents/contract.pdf".to_owned(),
            owner_id: owner,
        })
        .await?;
    Ok(d.id)
}

fn new_round(document_id: DocumentId, requester_id: UserId, draft: bool) -> NewRound {
    NewRound {
        document_id,
        edited_file: "documents/with_signatures/contract.pdf".to_owned(),
        requester_id,
        draft,
    }
}

async fn all_round_count(store: &dyn WorkflowStore) -> Result<usize, StoreError> {
    let filter = RoundFilter {
        include_drafts: true,
        ..RoundFilter::default()
    };
    Ok(store.round_tallies(&filter).await?.len())
}

/// Run the full workflow store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if a store call fails unexpectedly.
pub async fn run_store_conformance_tests(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    test_users(store).await?;
    test_documents(store).await?;
    test_signature_upsert(store).await?;
    test_create_round(store).await?;
    test_create_round_missing_signature(store).await?;
    test_finalize_round(store).await?;
    test_apply_decision(store).await?;
    test_tallies_and_signature_rounds(store).await?;
    test_concurrent_first_uploads(store).await?;
    test_concurrent_decisions(store).await?;
    Ok(())
}

async fn test_users(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let before = store.count_users().await?;
    let id = user(store, "conf-alice", Role::Signer).await?;
    let fetched = store.get_user(id).await?.expect("user should exist");
    assert_eq!(fetched.username, "conf-alice");
    assert_eq!(fetched.role, Role::Signer);
    assert_eq!(store.count_users().await?, before + 1);

    let dup = user(store, "conf-alice", Role::Viewer).await;
    assert!(
        matches!(dup, Err(StoreError::Conflict(_))),
        "duplicate username should conflict"
    );
    assert!(store.get_user(UserId::new(-1)).await?.is_none());
    Ok(())
}

async fn test_documents(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let owner = user(store, "conf-owner", Role::Admin).await?;
    let id = document(store, owner).await?;
    let doc = store.get_document(id).await?.expect("document should exist");
    assert_eq!(doc.owner_id, owner);
    assert_eq!(doc.title, "Contract");

    let orphan = store
        .create_document(NewDocument {
            title: "Orphan".to_owned(),
            file: "documents/orphan.pdf".to_owned(),
            owner_id: UserId::new(-1),
        })
        .await;
    assert!(
        matches!(orphan, Err(StoreError::MissingReference(_))),
        "document with unknown owner should be rejected"
    );
    Ok(())
}

async fn test_signature_upsert(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let signer = user(store, "conf-upsert", Role::Signer).await?;

    let first = store.upsert_signature(signer, "signatures/a.png").await?;
    assert!(first.replaced_file.is_none(), "first upload replaces nothing");

    let second = store.upsert_signature(signer, "signatures/b.png").await?;
    assert_eq!(
        second.signature.id, first.signature.id,
        "re-upload must overwrite the same row"
    );
    assert_eq!(second.replaced_file.as_deref(), Some("signatures/a.png"));
    assert_eq!(second.signature.file, "signatures/b.png");

    let owned = store.list_signatures(Some(signer)).await?;
    assert_eq!(owned.len(), 1, "one signature per user");

    let orphan = store
        .upsert_signature(UserId::new(-1), "signatures/orphan.png")
        .await;
    assert!(
        matches!(orphan, Err(StoreError::MissingReference(_))),
        "signature for unknown user should be rejected"
    );

    let other = user(store, "conf-upsert-2", Role::Signer).await?;
    let newer = store.upsert_signature(other, "signatures/c.png").await?;
    let all = store.list_signatures(None).await?;
    assert_eq!(
        all.first().map(|s| s.id),
        Some(newer.signature.id),
        "list is newest-first"
    );
    Ok(())
}

async fn test_create_round(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let owner = user(store, "conf-round-owner", Role::Admin).await?;
    let a = user(store, "conf-round-a", Role::Signer).await?;
    let b = user(store, "conf-round-b", Role::Signer).await?;
    let sig_a = store.upsert_signature(a, "signatures/ra.png").await?.signature;
    let sig_b = store.upsert_signature(b, "signatures/rb.png").await?.signature;
    let doc = document(store, owner).await?;

    let (round, statuses) = store
        .create_round(new_round(doc, owner, true), &[sig_a.id, sig_b.id])
        .await?;
    assert!(round.draft);
    assert_eq!(round.requester_id, owner);
    assert_eq!(statuses.len(), 2);
    assert!(
        statuses
            .iter()
            .all(|s| s.status == ApprovalStatus::Pending && s.round_id == round.id)
    );

    let details = store.status_details(round.id).await?;
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].signature_id, sig_a.id);
    assert_eq!(details[0].signer_id, a);
    assert_eq!(details[0].signer_name, "conf-round-a");

    let fetched = store.get_round(round.id).await?.expect("round should exist");
    assert_eq!(fetched, round);
    Ok(())
}

async fn test_create_round_missing_signature(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let owner = user(store, "conf-atomic-owner", Role::Admin).await?;
    let a = user(store, "conf-atomic-a", Role::Signer).await?;
    let sig_a = store.upsert_signature(a, "signatures/xa.png").await?.signature;
    let doc = document(store, owner).await?;

    let before = all_round_count(store).await?;
    let result = store
        .create_round(new_round(doc, owner, false), &[sig_a.id, SignatureId::new(-7)])
        .await;
    assert!(
        matches!(result, Err(StoreError::MissingReference(_))),
        "unknown signature should be a missing reference"
    );
    assert_eq!(
        all_round_count(store).await?,
        before,
        "failed round creation must leave no rows"
    );

    let result = store
        .create_round(new_round(DocumentId::new(-1), owner, false), &[sig_a.id])
        .await;
    assert!(matches!(result, Err(StoreError::MissingReference(_))));
    Ok(())
}

async fn test_finalize_round(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let owner = user(store, "conf-final-owner", Role::Admin).await?;
    let stranger = user(store, "conf-final-stranger", Role::Admin).await?;
    let doc = document(store, owner).await?;
    let (round, _) = store.create_round(new_round(doc, owner, true), &[]).await?;

    assert_eq!(
        store.finalize_round(round.id, stranger).await?,
        FinalizeResult::NotFound,
        "non-owner sees the round as missing"
    );
    match store.finalize_round(round.id, owner).await? {
        FinalizeResult::Finalized(r) => assert!(!r.draft),
        other => panic!("expected Finalized, got {other:?}"),
    }
    assert_eq!(
        store.finalize_round(round.id, owner).await?,
        FinalizeResult::AlreadyFinal
    );
    assert_eq!(
        store.finalize_round(RoundId::new(-1), owner).await?,
        FinalizeResult::NotFound
    );
    Ok(())
}

async fn test_apply_decision(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let owner = user(store, "conf-decide-owner", Role::Admin).await?;
    let a = user(store, "conf-decide-a", Role::Signer).await?;
    let sig_a = store.upsert_signature(a, "signatures/da.png").await?.signature;
    let doc = document(store, owner).await?;
    let (round, statuses) = store
        .create_round(new_round(doc, owner, false), &[sig_a.id])
        .await?;
    let status_id = statuses[0].id;

    match store
        .apply_decision(status_id, Decision::Approve, a, false)
        .await?
    {
        DecisionResult::Applied { status, log } => {
            assert_eq!(status.status, ApprovalStatus::Approved);
            assert_eq!(log.status_id, status_id);
            assert_eq!(log.round_id, round.id);
            assert_eq!(log.document_id, doc);
            assert_eq!(log.signer_id, a);
            assert_eq!(log.action, Decision::Approve);
        }
        other => panic!("expected Applied, got {other:?}"),
    }

    assert_eq!(
        store
            .apply_decision(status_id, Decision::Reject, a, false)
            .await?,
        DecisionResult::AlreadyDecided(ApprovalStatus::Approved),
        "strict mode refuses a second decision"
    );

    match store
        .apply_decision(status_id, Decision::Reject, a, true)
        .await?
    {
        DecisionResult::Applied { status, .. } => {
            assert_eq!(status.status, ApprovalStatus::Rejected);
        }
        other => panic!("expected Applied, got {other:?}"),
    }

    let log = store.decision_log(round.id).await?;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].action, Decision::Approve);
    assert_eq!(log[1].action, Decision::Reject);

    assert_eq!(
        store
            .apply_decision(StatusId::new(-1), Decision::Approve, a, true)
            .await?,
        DecisionResult::NotFound
    );
    Ok(())
}

async fn test_tallies_and_signature_rounds(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let owner = user(store, "conf-tally-owner", Role::Admin).await?;
    let a = user(store, "conf-tally-a", Role::Signer).await?;
    let sig_a = store.upsert_signature(a, "signatures/ta.png").await?.signature;
    let doc = document(store, owner).await?;

    let (final_round, statuses) = store
        .create_round(new_round(doc, owner, false), &[sig_a.id])
        .await?;
    let (draft_round, _) = store
        .create_round(new_round(doc, owner, true), &[sig_a.id])
        .await?;
    let (empty_round, _) = store.create_round(new_round(doc, owner, false), &[]).await?;

    store
        .apply_decision(statuses[0].id, Decision::Approve, a, true)
        .await?;

    let tallies = store
        .round_tallies(&RoundFilter::finalized().with_requester(owner))
        .await?;
    let ids: Vec<RoundId> = tallies.iter().map(|t| t.round.id).collect();
    assert!(ids.contains(&final_round.id));
    assert!(ids.contains(&empty_round.id));
    assert!(!ids.contains(&draft_round.id), "drafts excluded by default");

    let final_tally = tallies
        .iter()
        .find(|t| t.round.id == final_round.id)
        .expect("final round tally");
    assert_eq!((final_tally.total, final_tally.approved), (1, 1));
    assert!(final_tally.is_fully_approved());

    let empty_tally = tallies
        .iter()
        .find(|t| t.round.id == empty_round.id)
        .expect("empty round tally");
    assert_eq!(empty_tally.total, 0);
    assert!(!empty_tally.is_fully_approved());

    let by_id = store
        .round_tallies(&RoundFilter::by_ids([draft_round.id]))
        .await?;
    assert_eq!(by_id.len(), 1);
    assert!(by_id[0].round.draft);
    assert_eq!(by_id[0].pending, 1);

    let rounds = store.list_rounds_for_signature(sig_a.id).await?;
    let ids: Vec<RoundId> = rounds.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![final_round.id], "only non-draft rounds, once each");
    Ok(())
}

async fn test_concurrent_first_uploads(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let signer = user(store, "conf-race-upload", Role::Signer).await?;
    let files = [
        "signatures/r1.png",
        "signatures/r2.png",
        "signatures/r3.png",
        "signatures/r4.png",
    ];

    let (a, b, c, d) = tokio::join!(
        store.upsert_signature(signer, files[0]),
        store.upsert_signature(signer, files[1]),
        store.upsert_signature(signer, files[2]),
        store.upsert_signature(signer, files[3]),
    );
    let results = [a?, b?, c?, d?];

    let owned = store.list_signatures(Some(signer)).await?;
    assert_eq!(owned.len(), 1, "racing first uploads leave one row");
    assert!(
        results.iter().all(|r| r.signature.id == owned[0].id),
        "every upload resolves to the same signature id"
    );
    assert_eq!(
        results.iter().filter(|r| r.replaced_file.is_none()).count(),
        1,
        "exactly one upload creates the row"
    );

    let mut accounted: Vec<&str> = results
        .iter()
        .filter_map(|r| r.replaced_file.as_deref())
        .collect();
    accounted.push(owned[0].file.as_str());
    accounted.sort_unstable();
    assert_eq!(accounted, files, "each file is either kept or reported replaced");
    Ok(())
}

async fn test_concurrent_decisions(store: &dyn WorkflowStore) -> Result<(), StoreError> {
    let owner = user(store, "conf-race-owner", Role::Admin).await?;
    let a = user(store, "conf-race-signer", Role::Signer).await?;
    let sig = store.upsert_signature(a, "signatures/race.png").await?.signature;
    let doc = document(store, owner).await?;

    let (round, statuses) = store
        .create_round(new_round(doc, owner, false), &[sig.id])
        .await?;
    let status_id = statuses[0].id;
    let (r1, r2, r3, r4) = tokio::join!(
        store.apply_decision(status_id, Decision::Approve, a, true),
        store.apply_decision(status_id, Decision::Reject, a, true),
        store.apply_decision(status_id, Decision::Approve, a, true),
        store.apply_decision(status_id, Decision::Reject, a, true),
    );
    for result in [r1?, r2?, r3?, r4?] {
        assert!(
            matches!(result, DecisionResult::Applied { .. }),
            "permissive decisions all apply, got {result:?}"
        );
    }

    let log = store.decision_log(round.id).await?;
    assert_eq!(log.len(), 4, "one log entry per decision");
    let last = log.last().expect("log is not empty").action;
    let current = store.get_status(status_id).await?.expect("status exists");
    assert_eq!(
        current.status,
        last.outcome(),
        "final status matches the last logged decision"
    );

    let (round, statuses) = store
        .create_round(new_round(doc, owner, false), &[sig.id])
        .await?;
    let status_id = statuses[0].id;
    let (r1, r2, r3) = tokio::join!(
        store.apply_decision(status_id, Decision::Approve, a, false),
        store.apply_decision(status_id, Decision::Reject, a, false),
        store.apply_decision(status_id, Decision::Approve, a, false),
    );
    let results = [r1?, r2?, r3?];
    let applied = results
        .iter()
        .filter(|r| matches!(r, DecisionResult::Applied { .. }))
        .count();
    assert_eq!(applied, 1, "strict mode lets exactly one decision through");
    assert!(
        results
            .iter()
            .all(|r| matches!(r, DecisionResult::Applied { .. } | DecisionResult::AlreadyDecided(_))),
        "the rest see the row already decided"
    );
    assert_eq!(store.decision_log(round.id).await?.len(), 1);
    Ok(())
}
