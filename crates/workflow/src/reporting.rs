//! Read-only projections over round completion.

use tracing::debug;

use signet_core::{Round, UserId};
use signet_store::RoundFilter;

use crate::engine::WorkflowEngine;
use crate::error::WorkflowError;
use crate::views::Overview;

impl WorkflowEngine {
    /// Final rounds whose fully-approved state equals `approved`.
    ///
    /// Drafts never appear. A final round with no status rows is not fully
    /// approved and so lands in the `approved == false` set.
    pub async fn list_rounds_by_approval(&self, approved: bool) -> Result<Vec<Round>, WorkflowError> {
        let tallies = self.store.round_tallies(&RoundFilter::finalized()).await?;
        let rounds: Vec<Round> = tallies
            .into_iter()
            .filter(|t| t.is_fully_approved() == approved)
            .map(|t| t.round)
            .collect();
        debug!(approved, count = rounds.len(), "rounds by approval");
        Ok(rounds)
    }

    /// Fully approved final rounds opened by `user_id`.
    pub async fn signed_rounds_for_user(&self, user_id: UserId) -> Result<Vec<Round>, WorkflowError> {
        self.get_user(user_id).await?;
        let tallies = self
            .store
            .round_tallies(&RoundFilter::finalized().with_requester(user_id))
            .await?;
        Ok(tallies
            .into_iter()
            .filter(signet_core::RoundTally::is_fully_approved)
            .map(|t| t.round)
            .collect())
    }

    pub async fn overview(&self) -> Result<Overview, WorkflowError> {
        let tallies = self.store.round_tallies(&RoundFilter::finalized()).await?;
        let fully_signed = tallies.iter().filter(|t| t.is_fully_approved()).count() as u64;
        let pending = tallies.iter().filter(|t| t.is_pending()).count() as u64;
        let users = self.store.count_users().await?;
        Ok(Overview {
            total_documents: fully_signed + pending,
            fully_signed,
            pending,
            users,
        })
    }
}
