//! Request entry points.
//!
//! The engine dispatches once per call on the attribute's class: IP columns
//! go through the trie compressor, discrete columns through the counter.

use crate::address::Address;
use crate::attribute::{AttributeClass, AttributeKind, AttributeValue};
use crate::candidates::CandidateArena;
use crate::compressor::{BottomUpCompressor, Deadline};
use crate::config::EngineConfig;
use crate::counter::UnivariateCounter;
use crate::error::{Result, SuggestError};
use crate::hit::CountedHit;
use crate::ranker::SuggestionRanker;
use crate::suggestion::Suggestion;
use crate::trie::AddressTrieBuilder;
use hitsift_clock::{Clock, SystemClock};
use std::collections::BTreeSet;

/// Suggestions for one attribute plus statistics about the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRun {
    pub kind: AttributeKind,
    pub suggestions: Vec<Suggestion>,
    /// Sum of all counts in the column.
    pub total_hits: u64,
    /// Distinct values in the column (trie leaves for IP attributes).
    pub distinct_values: usize,
    /// Layer folds performed; always 0 for discrete attributes.
    pub passes: u32,
}

/// Stateless suggestion engine. Every call recomputes from its input.
#[derive(Debug)]
pub struct SuggestionEngine<C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
}

impl SuggestionEngine<SystemClock> {
    /// Engine on the system clock. Fails on an invalid config.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> SuggestionEngine<C> {
    /// Engine reading deadlines from `clock`.
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Top `amount` suggestions for `kind` over `hits`.
    pub fn suggest(&self, hits: &[CountedHit], kind: AttributeKind, amount: usize) -> Result<Vec<Suggestion>> {
        self.suggest_detailed(hits, kind, amount).map(|run| run.suggestions)
    }

    /// Like [`suggest`](Self::suggest) with the attribute given by name.
    pub fn suggest_by_name(&self, hits: &[CountedHit], attribute: &str, amount: usize) -> Result<Vec<Suggestion>> {
        let kind: AttributeKind = attribute.parse()?;
        self.suggest(hits, kind, amount)
    }

    /// Suggestions for `kind` together with run statistics.
    ///
    /// Every hit must carry the attribute; the first one that does not fails
    /// the whole request.
    pub fn suggest_detailed(&self, hits: &[CountedHit], kind: AttributeKind, amount: usize) -> Result<SuggestionRun> {
        let column = hits
            .iter()
            .enumerate()
            .map(|(index, counted)| {
                counted
                    .hit
                    .attribute(kind)
                    .map(|value| (value, counted.count))
                    .ok_or(SuggestError::MissingAttribute { kind, index })
            })
            .collect::<Result<Vec<_>>>()?;

        self.suggest_column(kind, column, amount)
    }

    /// Suggestions for an already extracted `(value, count)` column.
    pub fn suggest_column(
        &self,
        kind: AttributeKind,
        column: Vec<(AttributeValue, u64)>,
        amount: usize,
    ) -> Result<SuggestionRun> {
        match kind.class() {
            AttributeClass::Ip => self.compress_column(kind, column, amount),
            AttributeClass::Discrete => Ok(Self::count_column(kind, column, amount)),
        }
    }

    /// Run several attributes over the same hits, in the order given.
    ///
    /// With `parallel` set, up to `max_threads` attributes are computed at
    /// once on scoped threads, and each may also split its large layers.
    /// The output does not depend on the mode.
    pub fn suggest_many(
        &self,
        hits: &[CountedHit],
        kinds: &[AttributeKind],
        amount: usize,
    ) -> Result<Vec<SuggestionRun>> {
        if !self.config.parallel || kinds.len() < 2 {
            return kinds
                .iter()
                .map(|&kind| self.suggest_detailed(hits, kind, amount))
                .collect();
        }

        let mut runs = Vec::with_capacity(kinds.len());
        for chunk in kinds.chunks(self.config.max_threads) {
            let results: Vec<Result<SuggestionRun>> = std::thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|&kind| scope.spawn(move || self.suggest_detailed(hits, kind, amount)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect()
            });
            for result in results {
                runs.push(result?);
            }
        }
        Ok(runs)
    }

    fn compress_column(
        &self,
        kind: AttributeKind,
        column: Vec<(AttributeValue, u64)>,
        amount: usize,
    ) -> Result<SuggestionRun> {
        let mut builder = AddressTrieBuilder::new(kind, self.config.rule_weight);
        for (value, count) in column {
            builder.push(Self::address_of(kind, &value)?, count)?;
        }

        let mut arena = CandidateArena::with_capacity(builder.len() * 2);
        let leaves = builder.build(&mut arena);
        let total_hits = leaves.total_hits;
        let distinct_values = leaves.nodes.len();

        let deadline = self
            .config
            .timeout_ms
            .map(|timeout_ms| Deadline::after(&self.clock, timeout_ms));
        let compression = BottomUpCompressor::new(self.config.rule_weight, total_hits)
            .with_deadline(deadline)
            .with_parallelism(self.config.layer_parallelism())
            .compress(leaves, &mut arena)?;

        let candidates = compression
            .root
            .map(|root| arena.to_list(&root.candidates))
            .unwrap_or_default();

        Ok(SuggestionRun {
            kind,
            suggestions: SuggestionRanker::new(kind, amount).rank(candidates),
            total_hits,
            distinct_values,
            passes: compression.passes,
        })
    }

    fn count_column(kind: AttributeKind, column: Vec<(AttributeValue, u64)>, amount: usize) -> SuggestionRun {
        let total_hits: u64 = column.iter().map(|(_, count)| count).sum();
        let distinct_values = column
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(value, _)| value)
            .collect::<BTreeSet<_>>()
            .len();

        SuggestionRun {
            kind,
            suggestions: UnivariateCounter::new(kind, amount).count(column),
            total_hits,
            distinct_values,
            passes: 0,
        }
    }

    fn address_of(kind: AttributeKind, value: &AttributeValue) -> Result<Address> {
        value
            .as_address()
            .copied()
            .ok_or_else(|| SuggestError::NotAnAddress {
                kind,
                value: value.to_string(),
            })
    }
}
