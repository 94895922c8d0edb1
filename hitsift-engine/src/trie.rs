//! Leaf layer construction for the address trie.
//!
//! The trie is never materialized as a pointer tree. Each layer is a vector
//! of nodes sorted by address, all with the same prefix length; a node's
//! sibling, when it has hits, is always its right-hand neighbour.

use crate::address::{Address, AddressFamily};
use crate::attribute::AttributeKind;
use crate::candidates::{CandidateArena, CandidateGroup, CandidateSuggestion};
use crate::error::{Result, SuggestError};

/// Working node of one compression run.
#[derive(Debug)]
pub struct TrieNode {
    pub prefix: Address,
    /// Total hits under `prefix`.
    pub size: u64,
    /// Minimum encoded cost of the hits under this node.
    pub compress_cost: f64,
    /// Subnets realizing `compress_cost`.
    pub candidates: CandidateGroup,
}

impl TrieNode {
    /// Move this node one level up without merging.
    ///
    /// The sibling subnet holds no hits, so size, cost and candidates carry
    /// over unchanged; only the prefix shortens.
    pub fn promote(self) -> Self {
        Self {
            prefix: self.prefix.parent().unwrap_or(self.prefix),
            ..self
        }
    }
}

/// The sorted, coalesced bottom layer plus run-wide totals.
#[derive(Debug)]
pub struct LeafLayer {
    pub nodes: Vec<TrieNode>,
    pub total_hits: u64,
    pub family: Option<AddressFamily>,
}

/// Collects `(address, count)` pairs for one attribute column and turns them
/// into the leaf layer.
#[derive(Debug)]
pub struct AddressTrieBuilder {
    kind: AttributeKind,
    rule_weight: f64,
    family: Option<AddressFamily>,
    entries: Vec<(Address, u64)>,
}

impl AddressTrieBuilder {
    pub fn new(kind: AttributeKind, rule_weight: f64) -> Self {
        Self {
            kind,
            rule_weight,
            family: None,
            entries: Vec::new(),
        }
    }

    /// Add `count` hits at `address`. Zero counts are ignored.
    ///
    /// Fails when `address` is a subnet rather than a single host, or belongs
    /// to a different family than earlier addresses: every leaf must sit at
    /// full prefix length of one address width for layers to fold.
    pub fn push(&mut self, address: Address, count: u64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if address.subnet_bits() != 0 {
            return Err(SuggestError::NotAHost { kind: self.kind, address });
        }
        match self.family {
            None => self.family = Some(address.family()),
            Some(expected) if expected != address.family() => {
                return Err(SuggestError::MixedAddressFamily {
                    kind: self.kind,
                    expected,
                    found: address.family(),
                });
            }
            Some(_) => {}
        }
        self.entries.push((address, count));
        Ok(())
    }

    /// Number of pushed (not yet coalesced) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort, coalesce equal addresses and seed every leaf as a one-rule
    /// candidate costing exactly `rule_weight`.
    pub fn build(mut self, arena: &mut CandidateArena) -> LeafLayer {
        self.entries.sort_unstable_by_key(|(address, _)| *address);

        let mut nodes: Vec<TrieNode> = Vec::with_capacity(self.entries.len());
        let mut total_hits = 0u64;
        let mut runs: Vec<(Address, u64)> = Vec::with_capacity(self.entries.len());

        for (address, count) in self.entries {
            total_hits += count;
            match runs.last_mut() {
                Some((last, size)) if *last == address => *size += count,
                _ => runs.push((address, count)),
            }
        }

        let score = 1.0 / self.rule_weight;
        for (prefix, size) in runs {
            let candidates = arena.singleton(CandidateSuggestion {
                subnet: prefix,
                size,
                score,
            });
            nodes.push(TrieNode {
                prefix,
                size,
                compress_cost: self.rule_weight,
                candidates,
            });
        }

        LeafLayer {
            nodes,
            total_hits,
            family: self.family,
        }
    }
}
