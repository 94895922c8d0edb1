//! Ranking of the root's candidate subnets.

use crate::attribute::{AttributeKind, AttributeValue};
use crate::candidates::CandidateSuggestion;
use crate::suggestion::Suggestion;

/// Orders candidates by covered hits, largest first, and keeps the top
/// `amount`.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRanker {
    kind: AttributeKind,
    amount: usize,
}

impl SuggestionRanker {
    pub fn new(kind: AttributeKind, amount: usize) -> Self {
        Self { kind, amount }
    }

    /// Rank by `size` only; equal sizes keep their trie (address) order.
    pub fn rank(&self, mut candidates: Vec<CandidateSuggestion>) -> Vec<Suggestion> {
        candidates.sort_by(|a, b| b.size.cmp(&a.size));
        candidates
            .into_iter()
            .take(self.amount)
            .map(|c| Suggestion::new(self.kind, AttributeValue::Ip(c.subnet), c.size, c.score))
            .collect()
    }
}
