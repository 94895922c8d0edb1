//! hitsift CLI binary.
//!
//! Entry point for the `hitsift` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use hitsift_cli::exit::{codes, exit_code};
use hitsift_cli::{execute_suggest, Cli, Command, CommandError, StderrLogger, SuggestArgs, Verbosity};
use hitsift_clock::SystemClock;
use hitsift_fs::RealFilesystem;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here, on stdout
            let code = if e.use_stderr() { codes::INVALID_ARGS } else { codes::SUCCESS };
            let _ = e.print();
            return ExitCode::from(code as u8);
        }
    };

    let result = match cli.command {
        Command::Suggest(args) => run_suggest(args),
    };

    match result {
        Ok(()) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

/// Run the suggest command.
fn run_suggest(args: SuggestArgs) -> Result<(), CommandError> {
    let logger = StderrLogger::new(Verbosity::from_count(args.verbose));
    let outcome = execute_suggest(&args, &RealFilesystem, &SystemClock, &logger)?;

    if outcome.output_path.is_none() {
        print!("{}", outcome.json);
    }

    Ok(())
}
