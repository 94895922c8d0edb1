//! Suggest command orchestration.
//!
//! Loads hits, drops those already covered by a rule or outside the filter,
//! runs the engine for every requested attribute and renders the result.

use std::path::PathBuf;

use hitsift_clock::Clock;
use hitsift_engine::{count_hits, uncovered_hits, Rule, SuggestionEngine};
use hitsift_fs::Filesystem;

use crate::cli::SuggestArgs;
use crate::io::{format_timestamp, load_hits, load_rules, AttributeResult, OutputWriter, SuggestionDocument};
use crate::logger::Logger;

use super::CommandResult;

/// Result of suggest command execution.
#[derive(Debug)]
pub struct SuggestOutcome {
    pub document: SuggestionDocument,
    /// Rendered document.
    pub json: String,
    /// Where the document was written; `None` means the caller prints `json`.
    pub output_path: Option<PathBuf>,
    /// Hit records read from the hits file.
    pub loaded_hits: usize,
    /// Rules read from the rules file.
    pub rule_count: usize,
}

/// Execute the suggest command.
pub fn execute_suggest<F, C, L>(args: &SuggestArgs, fs: &F, clock: &C, logger: &L) -> CommandResult<SuggestOutcome>
where
    F: Filesystem,
    C: Clock,
    L: Logger,
{
    args.validate()?;
    let amount = args.checked_amount()?;
    let filter = args.filter()?;

    let hits = load_hits(fs, &args.hits)?;
    let loaded_hits = hits.len();
    logger.verbose(&format!("loaded {} hits from {}", loaded_hits, args.hits.display()));

    let rules: Vec<Rule> = match &args.rules {
        Some(path) => {
            let rules = load_rules(fs, path)?;
            logger.verbose(&format!("loaded {} rules from {}", rules.len(), path.display()));
            rules
        }
        None => Vec::new(),
    };

    let counted = count_hits(hits);
    let distinct = counted.len();
    let uncovered = uncovered_hits(counted, &rules, &filter);
    let total_hits: u64 = uncovered.iter().map(|h| h.count).sum();
    logger.verbose(&format!(
        "{} of {} hits uncovered and inside the filter ({} distinct, {} before filtering)",
        total_hits,
        loaded_hits,
        uncovered.len(),
        distinct
    ));

    let engine = SuggestionEngine::with_clock(args.engine_config(), clock)?;
    let runs = engine.suggest_many(&uncovered, &args.attribute, amount)?;
    for run in &runs {
        logger.debug(&format!(
            "{}: {} suggestions from {} distinct values in {} passes",
            run.kind,
            run.suggestions.len(),
            run.distinct_values,
            run.passes
        ));
    }

    let document = SuggestionDocument {
        generated_at: format_timestamp(clock.now_millis()),
        rule_weight: args.rule_weight,
        total_hits,
        results: runs.into_iter().map(AttributeResult::from).collect(),
    };
    let json = document.to_json()?;

    let output_path = match &args.out {
        Some(path) => {
            let written = OutputWriter::new(fs).write(path, &document)?;
            logger.info(&format!("wrote suggestions to {}", written.display()));
            Some(written)
        }
        None => None,
    };

    Ok(SuggestOutcome {
        document,
        json,
        output_path,
        loaded_hits,
        rule_count: rules.len(),
    })
}
