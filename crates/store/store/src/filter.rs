use signet_core::{RoundId, UserId};

/// Selects which rounds [`round_tallies`](crate::WorkflowStore::round_tallies)
/// returns. The default selects every non-draft round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundFilter {
    /// Restrict to these round IDs.
    pub ids: Option<Vec<RoundId>>,
    /// Restrict to rounds opened by this user.
    pub requester: Option<UserId>,
    /// Include draft rounds in the result.
    pub include_drafts: bool,
}

impl RoundFilter {
    /// Every non-draft round.
    #[must_use]
    pub fn finalized() -> Self {
        Self::default()
    }

    /// Exactly the given rounds, drafts included.
    #[must_use]
    pub fn by_ids(ids: impl IntoIterator<Item = RoundId>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
            requester: None,
            include_drafts: true,
        }
    }

    #[must_use]
    pub fn with_requester(mut self, requester: UserId) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Check whether a round with the given attributes passes this filter.
    #[must_use]
    pub fn matches(&self, id: RoundId, requester: UserId, draft: bool) -> bool {
        if draft && !self.include_drafts {
            return false;
        }
        if let Some(ref ids) = self.ids
            && !ids.contains(&id)
        {
            return false;
        }
        self.requester.is_none_or(|r| r == requester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_excludes_drafts() {
        let f = RoundFilter::finalized();
        assert!(f.matches(RoundId::new(1), UserId::new(1), false));
        assert!(!f.matches(RoundId::new(1), UserId::new(1), true));
    }

    #[test]
    fn by_ids_includes_drafts_but_only_listed() {
        let f = RoundFilter::by_ids([RoundId::new(2)]);
        assert!(f.matches(RoundId::new(2), UserId::new(1), true));
        assert!(!f.matches(RoundId::new(3), UserId::new(1), false));
    }

    #[test]
    fn requester_restricts_owner() {
        let f = RoundFilter::finalized().with_requester(UserId::new(5));
        assert!(f.matches(RoundId::new(1), UserId::new(5), false));
        assert!(!f.matches(RoundId::new(1), UserId::new(6), false));
    }
}
