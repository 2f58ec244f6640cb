//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent violations found while loading or querying a forest.
/// Any of them aborts a load; there is no partial forest.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read records: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record on line {line}: {source}")]
    Schema {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid child reference '{token}' in {parent}: expected <level>/<level_id>")]
    InvalidChildToken { parent: String, token: String },

    #[error("child {level}/{level_id} of {parent} not found in any completed lower level")]
    UnresolvedChild {
        parent: String,
        level: i64,
        level_id: i64,
    },

    #[error("duplicate node name: {name}")]
    DuplicateNode { name: String },

    #[error("duplicate level_id {level_id} in level {level}")]
    DuplicateLevelId { level: i64, level_id: i64 },

    #[error("node {child} claimed by {first} and {second}")]
    MultipleParents {
        child: String,
        first: String,
        second: String,
    },

    #[error("sentiment of {name} for period '{period}' has no '{class}' count")]
    MissingSentimentClass {
        name: String,
        period: String,
        class: String,
    },

    #[error("sentiment of {name} for period '{period}' has negative '{class}' count {count}")]
    NegativeSentimentCount {
        name: String,
        period: String,
        class: String,
        count: i64,
    },

    #[error("sentiment counts of {name} sum to zero for period '{period}'")]
    EmptySentiment { name: String, period: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Classify a serde_json failure on `line` (1-based) into parse or schema error.
    pub(crate) fn from_json(line: usize, source: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match source.classify() {
            Category::Data => DomainError::Schema { line, source },
            Category::Io => DomainError::Io(source.into()),
            Category::Syntax | Category::Eof => DomainError::Parse { line, source },
        }
    }
}
