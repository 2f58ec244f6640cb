//! CLI-level errors (wraps domain and config errors)

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("no cluster at level {level} with level_id {level_id}")]
    NodeNotFound { level: i64, level_id: i64 },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::NodeNotFound { .. } => crate::exitcode::USAGE,
            CliError::Config(_) => crate::exitcode::CONFIG,
            CliError::Domain(e) => match e {
                DomainError::FileNotFound(_) => crate::exitcode::NOINPUT,
                DomainError::Io(_) => crate::exitcode::IOERR,
                DomainError::EmptySentiment { .. } => crate::exitcode::SOFTWARE,
                DomainError::Parse { .. }
                | DomainError::Schema { .. }
                | DomainError::InvalidChildToken { .. }
                | DomainError::UnresolvedChild { .. }
                | DomainError::DuplicateNode { .. }
                | DomainError::DuplicateLevelId { .. }
                | DomainError::MultipleParents { .. }
                | DomainError::MissingSentimentClass { .. }
                | DomainError::NegativeSentimentCount { .. } => crate::exitcode::DATAERR,
            },
        }
    }
}
