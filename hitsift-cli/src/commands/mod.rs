//! Command orchestration for CLI subcommands.

pub mod suggest;

pub use suggest::{execute_suggest, SuggestOutcome};

use crate::cli::CliError;
use crate::io::{HitsLoadError, OutputWriterError, RulesLoadError};
use hitsift_engine::SuggestError;
use thiserror::Error;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("hits error: {0}")]
    Hits(#[from] HitsLoadError),

    #[error("rules error: {0}")]
    Rules(#[from] RulesLoadError),

    #[error("engine error: {0}")]
    Engine(#[from] SuggestError),

    #[error("output error: {0}")]
    Output(#[from] OutputWriterError),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
