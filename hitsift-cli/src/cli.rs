//! CLI argument parsing for hitsift.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use hitsift_engine::{
    checked_amount, AttributeKind, AttributeParseError, EngineConfig, Filter, HitMatcher, SuggestError,
    DEFAULT_AMOUNT, DEFAULT_MAX_THREADS, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_RULE_WEIGHT,
};
use thiserror::Error;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("{0}")]
    Engine(#[from] SuggestError),

    #[error("attribute {0} requested more than once")]
    DuplicateAttribute(AttributeKind),

    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] AttributeParseError),
}

/// hitsift - suggest firewall rules for uncovered hits.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "hitsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Suggest rule values for hits no rule covers yet.
    Suggest(SuggestArgs),
}

/// Arguments for the suggest command.
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SuggestArgs {
    /// CSV file of hits: source,destination,port,protocol.
    #[arg(long)]
    pub hits: PathBuf,

    /// Attributes to suggest values for (source, destination, service).
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub attribute: Vec<AttributeKind>,

    /// JSON file of existing rules; hits they match are ignored.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Only consider hits whose source lies in this subnet.
    #[arg(long)]
    pub filter_source: Option<String>,

    /// Only consider hits whose destination lies in this subnet.
    #[arg(long)]
    pub filter_destination: Option<String>,

    /// Only consider hits matching this service (e.g. "TCP 443").
    #[arg(long)]
    pub filter_service: Option<String>,

    /// Maximum number of suggestions per attribute.
    #[arg(short = 'n', long, default_value_t = DEFAULT_AMOUNT as i64, allow_negative_numbers = true)]
    pub amount: i64,

    /// Cost of one rule; higher values favour broader subnets.
    #[arg(short = 'k', long, default_value_t = DEFAULT_RULE_WEIGHT, allow_negative_numbers = true)]
    pub rule_weight: f64,

    /// Compute attributes, and the chunks of large layers, on separate threads.
    #[arg(long)]
    pub parallel: bool,

    /// Maximum threads used with --parallel.
    #[arg(long, default_value_t = DEFAULT_MAX_THREADS)]
    pub max_threads: usize,

    /// Address layer nodes per planning thread with --parallel.
    #[arg(long, default_value_t = DEFAULT_PARALLEL_THRESHOLD)]
    pub parallel_threshold: usize,

    /// Abort a compression running longer than this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Write the JSON document here instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Increase log output (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl SuggestArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        self.engine_config().validate()?;
        self.checked_amount()?;
        for (i, kind) in self.attribute.iter().enumerate() {
            if self.attribute[..i].contains(kind) {
                return Err(CliError::DuplicateAttribute(*kind));
            }
        }
        self.filter()?;
        Ok(())
    }

    /// Engine configuration from the flags.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new()
            .with_rule_weight(self.rule_weight)
            .with_parallel(self.parallel)
            .with_max_threads(self.max_threads)
            .with_parallel_threshold(self.parallel_threshold)
            .with_timeout_ms(self.timeout_ms)
    }

    /// The amount as a suggestion count.
    pub fn checked_amount(&self) -> Result<usize, CliError> {
        Ok(checked_amount(self.amount)?)
    }

    /// The view filter built from the --filter-* flags.
    pub fn filter(&self) -> Result<Filter, CliError> {
        Ok(HitMatcher::parse(
            self.filter_source.as_deref(),
            self.filter_destination.as_deref(),
            self.filter_service.as_deref(),
        )?)
    }
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
