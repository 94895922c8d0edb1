//! Existing-rules loader.
//!
//! The rules file is a JSON array of objects with optional `source`,
//! `destination` and `service` strings:
//!
//! ```json
//! [
//!   { "source": "10.0.0.0/8", "service": "TCP 22" },
//!   { "destination": "192.168.1.1" }
//! ]
//! ```
//!
//! A missing field, an empty string or `Any` leaves that attribute
//! unconstrained.

use std::path::Path;

use hitsift_engine::{AttributeParseError, HitMatcher, Rule};
use hitsift_fs::{Filesystem, FsError};
use serde::Deserialize;
use thiserror::Error;

/// Errors from rules loading.
#[derive(Debug, Error)]
pub enum RulesLoadError {
    #[error("failed to read rules file: {0}")]
    Read(#[from] FsError),

    #[error("invalid rules JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule #{index}: {source}")]
    Rule {
        index: usize,
        #[source]
        source: AttributeParseError,
    },
}

/// One rule as written in the file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    service: Option<String>,
}

/// Load rules from a JSON file.
pub fn load_rules<F: Filesystem>(fs: &F, path: &Path) -> Result<Vec<Rule>, RulesLoadError> {
    let content = fs.read_file(path)?;
    parse_rules(&content)
}

/// Parse rules JSON content from a string.
pub fn parse_rules(content: &str) -> Result<Vec<Rule>, RulesLoadError> {
    let entries: Vec<RuleEntry> = serde_json::from_str(content)?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            HitMatcher::parse(
                entry.source.as_deref(),
                entry.destination.as_deref(),
                entry.service.as_deref(),
            )
            .map_err(|source| RulesLoadError::Rule { index, source })
        })
        .collect()
}
