//! Suggestion document rendering and writing.
//!
//! The document is one JSON object:
//!
//! ```json
//! {
//!   "generated_at": "2024-01-01T00:00:00Z",
//!   "rule_weight": 500.0,
//!   "total_hits": 175,
//!   "results": [
//!     { "attribute": "destination", "suggestions": [ ... ] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, TimeZone, Utc};
use hitsift_engine::{AttributeKind, Suggestion, SuggestionRun};
use hitsift_fs::{Filesystem, FsError};
use serde::Serialize;
use thiserror::Error;

/// Errors from output writing.
#[derive(Debug, Error)]
pub enum OutputWriterError {
    #[error("failed to serialize suggestions: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to create output directory: {0}")]
    CreateDir(#[source] FsError),

    #[error("failed to write {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: FsError,
    },
}

/// Suggestions for one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeResult {
    pub attribute: AttributeKind,
    pub suggestions: Vec<Suggestion>,
}

impl From<SuggestionRun> for AttributeResult {
    fn from(run: SuggestionRun) -> Self {
        Self {
            attribute: run.kind,
            suggestions: run.suggestions,
        }
    }
}

/// The complete output of one suggest invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionDocument {
    pub generated_at: String,
    pub rule_weight: f64,
    /// Hits left after removing covered and filtered-out ones.
    pub total_hits: u64,
    pub results: Vec<AttributeResult>,
}

impl SuggestionDocument {
    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, OutputWriterError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Format milliseconds since the epoch as RFC 3339 UTC, second precision.
pub fn format_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| millis.to_string())
}

/// Writes suggestion documents through a [`Filesystem`].
pub struct OutputWriter<'a, F: Filesystem> {
    fs: &'a F,
}

impl<'a, F: Filesystem> OutputWriter<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Write `document` atomically to `path`, creating its directory first.
    pub fn write(&self, path: &Path, document: &SuggestionDocument) -> Result<PathBuf, OutputWriterError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent).map_err(OutputWriterError::CreateDir)?;
        }

        let json = document.to_json()?;
        self.fs
            .write_atomic(path, json.as_bytes())
            .map_err(|e| OutputWriterError::Write {
                file: path.display().to_string(),
                source: e,
            })?;
        Ok(path.to_path_buf())
    }
}
