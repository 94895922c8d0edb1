//! Hits CSV loader.
//!
//! Format:
//! - One hit per line: `source,destination,port,protocol`
//! - Lines starting with # are comments
//! - Empty lines are ignored
//! - An optional header line starts with `source`
//! - An empty column means the hit has no such attribute; port and protocol
//!   together form the service (`80,tcp` is `TCP 80`, `,udp` is `UDP`,
//!   `53,` is `Any 53`)

use std::path::Path;

use hitsift_engine::{Address, AttributeParseError, Hit, Service};
use hitsift_fs::{Filesystem, FsError};
use thiserror::Error;

const COLUMNS: usize = 4;

/// Errors from hits loading.
#[derive(Debug, Error)]
pub enum HitsLoadError {
    #[error("failed to read hits file: {0}")]
    Read(#[from] FsError),

    #[error("line {line}: expected 4 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: AttributeParseError,
    },
}

/// Load hits from a CSV file.
pub fn load_hits<F: Filesystem>(fs: &F, path: &Path) -> Result<Vec<Hit>, HitsLoadError> {
    let content = fs.read_file(path)?;
    parse_hits(&content)
}

/// Parse hits CSV content from a string.
pub fn parse_hits(content: &str) -> Result<Vec<Hit>, HitsLoadError> {
    let mut hits = Vec::new();
    let mut seen_row = false;

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if !seen_row && fields[0].eq_ignore_ascii_case("source") {
            seen_row = true;
            continue;
        }
        seen_row = true;

        let line = line_num + 1;
        if fields.len() != COLUMNS {
            return Err(HitsLoadError::ColumnCount {
                line,
                found: fields.len(),
            });
        }

        let hit = parse_row(&fields).map_err(|source| HitsLoadError::Parse { line, source })?;
        hits.push(hit);
    }

    Ok(hits)
}

fn parse_row(fields: &[&str]) -> Result<Hit, AttributeParseError> {
    Ok(Hit {
        source: parse_address(fields[0])?,
        destination: parse_address(fields[1])?,
        service: parse_service(fields[2], fields[3])?,
    })
}

fn parse_address(field: &str) -> Result<Option<Address>, AttributeParseError> {
    if field.is_empty() {
        return Ok(None);
    }
    field.parse().map(Some)
}

fn parse_service(port: &str, protocol: &str) -> Result<Option<Service>, AttributeParseError> {
    let text = match (port.is_empty(), protocol.is_empty()) {
        (true, true) => return Ok(None),
        (true, false) => protocol.to_string(),
        (false, true) => format!("Any {}", port),
        (false, false) => format!("{} {}", protocol, port),
    };
    text.parse().map(Some)
}
