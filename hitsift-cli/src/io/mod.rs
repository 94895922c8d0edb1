//! IO helpers for CLI operations.
//!
//! Provides utilities for:
//! - Loading hits CSV files
//! - Loading existing rules
//! - Writing the suggestion document

pub mod hits_loader;
pub mod output_writer;
pub mod rules_loader;

pub use hits_loader::{load_hits, parse_hits, HitsLoadError};
pub use output_writer::{format_timestamp, AttributeResult, OutputWriter, OutputWriterError, SuggestionDocument};
pub use rules_loader::{load_rules, parse_rules, RulesLoadError};
