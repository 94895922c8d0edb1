//! Engine configuration.

use crate::compressor::LayerParallelism;
use crate::error::{Result, SuggestError};

/// Default rule weight: the fixed cost of naming one subnet as a rule.
pub const DEFAULT_RULE_WEIGHT: f64 = 500.0;

/// Default number of suggestions returned per attribute.
pub const DEFAULT_AMOUNT: usize = 10;

/// Default for running attributes and large layers on separate threads.
pub const DEFAULT_PARALLEL: bool = false;

/// Default cap on threads used for attributes, and for the chunks of one layer.
pub const DEFAULT_MAX_THREADS: usize = 4;

/// Default number of layer nodes per planning thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 0x10000;

/// Engine configuration.
///
/// `rule_weight` is the only knob that changes results: higher values favour
/// fewer, broader subnets; lower values favour many precise ones.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub rule_weight: f64,
    pub parallel: bool,
    pub max_threads: usize,
    /// With `parallel` set, a layer is planned on one thread per this many
    /// nodes, up to `max_threads`.
    pub parallel_threshold: usize,
    /// Abort a compression that runs longer than this (checked between passes).
    pub timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule_weight: DEFAULT_RULE_WEIGHT,
            parallel: DEFAULT_PARALLEL,
            max_threads: DEFAULT_MAX_THREADS,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set rule_weight.
    pub fn with_rule_weight(mut self, rule_weight: f64) -> Self {
        self.rule_weight = rule_weight;
        self
    }

    /// Builder: enable or disable threading.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder: set max_threads.
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Builder: set parallel_threshold.
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    /// Layer threading for the compressor, `None` when not parallel.
    pub fn layer_parallelism(&self) -> Option<LayerParallelism> {
        self.parallel.then_some(LayerParallelism {
            threads: self.max_threads,
            threshold: self.parallel_threshold,
        })
    }

    /// Builder: set timeout_ms.
    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.rule_weight.is_finite() || self.rule_weight <= 0.0 {
            return Err(SuggestError::InvalidRuleWeight(self.rule_weight));
        }
        if self.max_threads == 0 {
            return Err(SuggestError::InvalidMaxThreads(self.max_threads));
        }
        Ok(())
    }
}

/// Convert a signed amount from an outer surface into a suggestion count.
pub fn checked_amount(amount: i64) -> Result<usize> {
    usize::try_from(amount).map_err(|_| SuggestError::InvalidAmount(amount))
}
