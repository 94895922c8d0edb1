//! Bottom-up minimum-description-length compression of the address trie.
//!
//! For a trie node `x` the compression cost is
//!
//! ```text
//! f(x) = min( |x| * (S(x) + log2(1 / P(x))) + K ,  f(x.left) + f(x.right) )
//! ```
//!
//! where `|x|` is the number of hits under `x`, `S(x)` the number of free
//! host bits of the subnet (log2 of its size), `P(x) = |x| / total` and `K`
//! the rule weight. The left term encodes all hits under `x` with one rule;
//! the right term keeps the children's best encodings. Each leaf costs `K`.
//!
//! Layers are folded one prefix bit at a time until one node remains. The
//! root's candidate group is the optimal set of subnets.

use crate::candidates::{CandidateArena, CandidateSuggestion};
use crate::error::{Result, SuggestError};
use crate::trie::{LeafLayer, TrieNode};
use hitsift_clock::Clock;

/// A caller deadline checked between layers.
#[derive(Clone, Copy)]
pub struct Deadline<'a> {
    clock: &'a dyn Clock,
    expires_at_millis: u64,
}

impl<'a> Deadline<'a> {
    /// Deadline `timeout_ms` from now on `clock`.
    pub fn after(clock: &'a dyn Clock, timeout_ms: u64) -> Self {
        Self {
            clock,
            expires_at_millis: clock.now_millis().saturating_add(timeout_ms),
        }
    }

    pub fn expired(&self) -> bool {
        self.clock.now_millis() > self.expires_at_millis
    }
}

impl std::fmt::Debug for Deadline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deadline")
            .field("expires_at_millis", &self.expires_at_millis)
            .finish()
    }
}

/// Result of folding a leaf layer to its root.
#[derive(Debug)]
pub struct Compression {
    /// `None` when there were no hits.
    pub root: Option<TrieNode>,
    /// Number of layer folds performed.
    pub passes: u32,
}

/// Within-layer threading: one planning thread per `threshold` nodes of a
/// layer, up to `threads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerParallelism {
    pub threads: usize,
    pub threshold: usize,
}

impl LayerParallelism {
    /// Number of chunks a layer of `len` nodes is planned in.
    pub fn jobs(&self, len: usize) -> usize {
        self.threads.min(1 + len / self.threshold.max(1))
    }
}

/// The pure part of the cost function, shared with planning threads.
#[derive(Debug, Clone, Copy)]
struct CostModel {
    rule_weight: f64,
    total_log2: f64,
}

impl CostModel {
    fn union_cost(&self, size: u64, subnet_bits: u32) -> f64 {
        let size = size as f64;
        // log2(1 / P) = log2(total) - log2(size), exactly zero when P = 1
        size * (f64::from(subnet_bits) + (self.total_log2 - size.log2())) + self.rule_weight
    }

    /// Decide every node of the parent layer of `nodes`.
    fn plan(&self, nodes: &[TrieNode]) -> Vec<Step> {
        let mut steps = Vec::with_capacity(nodes.len());
        let mut i = 0;
        while i < nodes.len() {
            let left = &nodes[i];
            match nodes.get(i + 1).filter(|right| left.prefix.is_sibling(&right.prefix)) {
                Some(right) => {
                    steps.push(self.decide(left, right));
                    i += 2;
                }
                None => {
                    steps.push(Step::Promote);
                    i += 1;
                }
            }
        }
        steps
    }

    fn decide(&self, left: &TrieNode, right: &TrieNode) -> Step {
        let size = left.size + right.size;
        // the parent has one more free host bit than either child
        let union = self.union_cost(size, left.prefix.subnet_bits() + 1);
        let separated = left.compress_cost + right.compress_cost;

        // On a tie the single, more general rule wins.
        if union <= separated {
            Step::Union(union)
        } else {
            Step::Separate(separated)
        }
    }
}

/// How one node of the parent layer is formed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    /// A lone node moves up unchanged.
    Promote,
    /// Two siblings become one rule with this cost.
    Union(f64),
    /// Two siblings keep their own candidates; the sum of their costs.
    Separate(f64),
}

/// Folds trie layers bottom-up, deciding union vs. separate at every merge.
#[derive(Debug)]
pub struct BottomUpCompressor<'a> {
    cost: CostModel,
    deadline: Option<Deadline<'a>>,
    parallelism: Option<LayerParallelism>,
}

impl<'a> BottomUpCompressor<'a> {
    /// `total_hits` is fixed for the whole run; every probability is taken
    /// against it.
    pub fn new(rule_weight: f64, total_hits: u64) -> Self {
        Self {
            cost: CostModel {
                rule_weight,
                total_log2: (total_hits.max(1) as f64).log2(),
            },
            deadline: None,
            parallelism: None,
        }
    }

    /// Builder: abort between layers once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Option<Deadline<'a>>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Builder: plan large layers on several threads.
    pub fn with_parallelism(mut self, parallelism: Option<LayerParallelism>) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Fold `leaves` until a single node remains.
    ///
    /// A lone node promoted further keeps its size, cost and candidates, so
    /// stopping at one node gives the same result as folding down to /0.
    /// Host leaves of one family meet at /0 at the latest; a layer still
    /// holding several nodes after that many passes is an error.
    pub fn compress(&self, leaves: LeafLayer, arena: &mut CandidateArena) -> Result<Compression> {
        let max_passes = leaves.family.map_or(0, |family| u32::from(family.max_prefix_len()));
        let mut layer = leaves.nodes;
        let mut passes = 0u32;

        while layer.len() > 1 {
            if passes >= max_passes {
                return Err(SuggestError::LayerDidNotConverge {
                    passes,
                    nodes: layer.len(),
                });
            }
            if self.deadline.is_some_and(|d| d.expired()) {
                return Err(SuggestError::DeadlineExceeded { passes });
            }
            layer = self.fold_layer(layer, arena);
            passes += 1;
        }

        Ok(Compression {
            root: layer.pop(),
            passes,
        })
    }

    /// Build the parent layer (prefix length minus one) of a sorted layer.
    ///
    /// Decisions are planned first, on several threads when the layer is
    /// large enough, then applied to the arena in layer order, so the result
    /// does not depend on threading.
    pub fn fold_layer(&self, layer: Vec<TrieNode>, arena: &mut CandidateArena) -> Vec<TrieNode> {
        let jobs = self.parallelism.map_or(1, |p| p.jobs(layer.len()));
        let steps = if jobs > 1 {
            self.plan_parallel(&layer, jobs)
        } else {
            self.cost.plan(&layer)
        };

        let mut next = Vec::with_capacity(steps.len());
        let mut nodes = layer.into_iter();
        for step in steps {
            let Some(left) = nodes.next() else { break };
            let right = match step {
                Step::Promote => None,
                Step::Union(_) | Step::Separate(_) => nodes.next(),
            };
            let node = match (step, right) {
                (Step::Union(cost), Some(right)) => Self::unite(left, right, cost, arena),
                (Step::Separate(cost), Some(right)) => Self::separate(left, right, cost, arena),
                _ => left.promote(),
            };
            next.push(node);
        }

        next
    }

    /// Cost of covering `size` hits with one rule for a subnet with
    /// `subnet_bits` free host bits.
    pub fn union_cost(&self, size: u64, subnet_bits: u32) -> f64 {
        self.cost.union_cost(size, subnet_bits)
    }

    fn plan_parallel(&self, layer: &[TrieNode], threads: usize) -> Vec<Step> {
        let cost = self.cost;
        std::thread::scope(|scope| {
            let handles: Vec<_> = split_at_siblings(layer, threads)
                .into_iter()
                .map(|chunk| scope.spawn(move || cost.plan(chunk)))
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        })
    }

    fn unite(left: TrieNode, right: TrieNode, cost: f64, arena: &mut CandidateArena) -> TrieNode {
        let parent = left.promote();
        let size = parent.size + right.size;
        let candidates = arena.singleton(CandidateSuggestion {
            subnet: parent.prefix,
            size,
            score: 1.0 / cost,
        });
        TrieNode {
            prefix: parent.prefix,
            size,
            compress_cost: cost,
            candidates,
        }
    }

    fn separate(left: TrieNode, right: TrieNode, cost: f64, arena: &mut CandidateArena) -> TrieNode {
        let parent = left.promote();
        let mut candidates = parent.candidates;
        candidates.splice_from(right.candidates, arena);
        TrieNode {
            prefix: parent.prefix,
            size: parent.size + right.size,
            compress_cost: cost,
            candidates,
        }
    }
}

/// Cut `layer` into about `parts` contiguous chunks.
///
/// A cut that would fall between two siblings moves one node right, so every
/// sibling pair is planned by the same thread.
pub fn split_at_siblings(layer: &[TrieNode], parts: usize) -> Vec<&[TrieNode]> {
    let chunk_len = layer.len().div_ceil(parts.max(1)).max(1);
    let mut chunks = Vec::with_capacity(parts);
    let mut rest = layer;

    while !rest.is_empty() {
        let mut to = chunk_len.min(rest.len());
        if to < rest.len() && rest[to - 1].prefix.is_sibling(&rest[to].prefix) {
            to += 1;
        }
        let (chunk, tail) = rest.split_at(to);
        chunks.push(chunk);
        rest = tail;
    }

    chunks
}
