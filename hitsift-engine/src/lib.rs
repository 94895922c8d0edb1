//! hitsift suggestion engine.
//!
//! Given logged firewall hits that no rule covers yet, proposes values for
//! one attribute that an operator could turn into a new rule. IP attributes
//! are compressed into a small set of subnets by a minimum-description-length
//! trie fold; other attributes fall back to frequency counting.

pub mod address;
pub mod attribute;
pub mod candidates;
pub mod compressor;
pub mod config;
pub mod counter;
pub mod engine;
pub mod error;
pub mod hit;
pub mod ranker;
pub mod suggestion;
pub mod trie;

pub use address::{Address, AddressFamily};
pub use attribute::{
    parse_protocol, AttributeClass, AttributeKind, AttributeParseError, AttributeValue, Service, PROTO_ICMP,
    PROTO_TCP, PROTO_UDP,
};
pub use candidates::{CandidateArena, CandidateGroup, CandidateSuggestion};
pub use compressor::{split_at_siblings, BottomUpCompressor, Compression, Deadline, LayerParallelism};
pub use config::{
    checked_amount, EngineConfig, DEFAULT_AMOUNT, DEFAULT_MAX_THREADS, DEFAULT_PARALLEL, DEFAULT_PARALLEL_THRESHOLD,
    DEFAULT_RULE_WEIGHT,
};
pub use counter::UnivariateCounter;
pub use engine::{SuggestionEngine, SuggestionRun};
pub use error::{Result, SuggestError};
pub use hit::{count_hits, uncovered_hits, CountedHit, Filter, Hit, HitMatcher, Rule};
pub use ranker::SuggestionRanker;
pub use suggestion::Suggestion;
pub use trie::{AddressTrieBuilder, LeafLayer, TrieNode};
