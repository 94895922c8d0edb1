//! Per-value counting for attributes without subnet structure.

use crate::attribute::{AttributeKind, AttributeValue};
use crate::suggestion::Suggestion;
use std::collections::BTreeMap;

/// Suggests the most frequent exact values of a discrete attribute.
#[derive(Debug, Clone, Copy)]
pub struct UnivariateCounter {
    kind: AttributeKind,
    amount: usize,
}

impl UnivariateCounter {
    pub fn new(kind: AttributeKind, amount: usize) -> Self {
        Self { kind, amount }
    }

    /// Group by value, score each as its share of all hits, and return the
    /// top `amount` by count. Equal counts come out in value order.
    pub fn count<I>(&self, values: I) -> Vec<Suggestion>
    where
        I: IntoIterator<Item = (AttributeValue, u64)>,
    {
        let mut buckets: BTreeMap<AttributeValue, u64> = BTreeMap::new();
        let mut total = 0u64;
        for (value, count) in values {
            if count == 0 {
                continue;
            }
            *buckets.entry(value).or_insert(0) += count;
            total += count;
        }

        let mut suggestions: Vec<Suggestion> = buckets
            .into_iter()
            .map(|(value, size)| Suggestion::new(self.kind, value, size, size as f64 / total as f64))
            .collect();
        suggestions.sort_by(|a, b| b.size.cmp(&a.size));
        suggestions.truncate(self.amount);
        suggestions
    }
}
