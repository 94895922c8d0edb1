//! hitsift CLI.
//!
//! Argument parsing, file loading and output for the `hitsift` binary. The
//! suggestion logic itself lives in `hitsift-engine`.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod io;
pub mod logger;

pub use cli::{parse_from, Cli, CliError, Command, SuggestArgs};
pub use commands::{execute_suggest, CommandError, CommandResult, SuggestOutcome};
pub use logger::{LogEntry, Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
