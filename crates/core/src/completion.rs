//! Aggregate completion of a round.
//!
//! A round is fully approved when it is final, has at least one status row,
//! and every row is approved. It is pending when it is final and at least one
//! row is still pending. Drafts are neither.

use serde::{Deserialize, Serialize};

use crate::model::Round;
use crate::types::RoundId;

/// A round together with counts of its status rows by state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTally {
    pub round: Round,
    pub total: u64,
    pub approved: u64,
    pub rejected: u64,
    pub pending: u64,
}

impl RoundTally {
    /// `total > 0` is required; an empty round is never complete.
    #[must_use]
    pub fn is_fully_approved(&self) -> bool {
        !self.round.draft && self.total > 0 && self.approved == self.total
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.round.draft && self.pending > 0
    }

    #[must_use]
    pub fn completion(&self) -> Completion {
        Completion {
            round_id: self.round.id,
            draft: self.round.draft,
            total: self.total,
            approved: self.approved,
            rejected: self.rejected,
            pending: self.pending,
            fully_approved: self.is_fully_approved(),
        }
    }
}

/// Completion summary returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Completion {
    pub round_id: RoundId,
    pub draft: bool,
    pub total: u64,
    pub approved: u64,
    pub rejected: u64,
    pub pending: u64,
    pub fully_approved: bool,
}
