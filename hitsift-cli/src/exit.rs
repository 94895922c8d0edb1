//! Exit codes for the hitsift CLI.

use crate::commands::CommandError;
use crate::io::{HitsLoadError, RulesLoadError};

/// Exit code constants.
pub mod codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments.
    pub const INVALID_ARGS: i32 = 1;
    /// IO error.
    pub const IO_ERROR: i32 = 2;
    /// Hits file could not be parsed.
    pub const HITS_ERROR: i32 = 3;
    /// Rules file could not be parsed.
    pub const RULES_ERROR: i32 = 4;
    /// Suggestion engine rejected the request.
    pub const ENGINE_ERROR: i32 = 5;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Hits(HitsLoadError::Read(_)) => codes::IO_ERROR,
        CommandError::Hits(_) => codes::HITS_ERROR,
        CommandError::Rules(RulesLoadError::Read(_)) => codes::IO_ERROR,
        CommandError::Rules(_) => codes::RULES_ERROR,
        CommandError::Engine(_) => codes::ENGINE_ERROR,
        CommandError::Output(_) => codes::IO_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliError;
    use crate::io::OutputWriterError;
    use hitsift_engine::{AttributeKind, AttributeParseError, SuggestError};
    use hitsift_fs::FsError;

    fn fs_error() -> FsError {
        FsError::Path("test".to_string())
    }

    #[test]
    fn test_exit_code_invalid_argument() {
        let error = CommandError::InvalidArgument(CliError::DuplicateAttribute(AttributeKind::Source));
        assert_eq!(exit_code(&error), codes::INVALID_ARGS);
    }

    #[test]
    fn test_exit_code_hits() {
        let read = CommandError::Hits(HitsLoadError::Read(fs_error()));
        assert_eq!(exit_code(&read), codes::IO_ERROR);

        let parse = CommandError::Hits(HitsLoadError::ColumnCount { line: 2, found: 1 });
        assert_eq!(exit_code(&parse), codes::HITS_ERROR);
    }

    #[test]
    fn test_exit_code_rules() {
        let read = CommandError::Rules(RulesLoadError::Read(fs_error()));
        assert_eq!(exit_code(&read), codes::IO_ERROR);

        let rule = CommandError::Rules(RulesLoadError::Rule {
            index: 0,
            source: AttributeParseError::InvalidProtocol("sctp".to_string()),
        });
        assert_eq!(exit_code(&rule), codes::RULES_ERROR);
    }

    #[test]
    fn test_exit_code_engine() {
        let error = CommandError::Engine(SuggestError::DeadlineExceeded { passes: 3 });
        assert_eq!(exit_code(&error), codes::ENGINE_ERROR);
    }

    #[test]
    fn test_exit_code_output() {
        let error = CommandError::Output(OutputWriterError::CreateDir(fs_error()));
        assert_eq!(exit_code(&error), codes::IO_ERROR);
    }

    #[test]
    fn test_exit_codes_constants() {
        assert_eq!(codes::SUCCESS, 0);
        assert_eq!(codes::INVALID_ARGS, 1);
        assert_eq!(codes::IO_ERROR, 2);
        assert_eq!(codes::HITS_ERROR, 3);
        assert_eq!(codes::RULES_ERROR, 4);
        assert_eq!(codes::ENGINE_ERROR, 5);
    }
}
