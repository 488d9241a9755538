//! CLI-specific error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::errors::QueryError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("join condition required: use --on <field> or --left-field with --right-field")]
    MissingJoinCondition,

    #[error("cannot use both --on and --left-field/--right-field")]
    ConflictingJoinCondition,

    #[error("no group-by fields specified")]
    NoGroupFields,

    #[error("no aggregations specified (use --count, --sum, --avg, --min or --max)")]
    NoAggregations,
}

impl CliError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Query(e) => e.code().code(),
            CliError::Open { .. } => "RQL_CLI_OPEN_FAILED",
            CliError::MissingJoinCondition | CliError::ConflictingJoinCondition => {
                "RQL_CLI_JOIN_CONDITION"
            }
            CliError::NoGroupFields | CliError::NoAggregations => "RQL_CLI_GROUP_SPEC",
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Query(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CliError::NoAggregations.code(), "RQL_CLI_GROUP_SPEC");
        assert_eq!(
            CliError::from(QueryError::config_invalid("x")).code(),
            "RQL_CONFIG_INVALID"
        );
    }

    #[test]
    fn test_open_message_names_path() {
        let err = CliError::Open {
            path: PathBuf::from("missing.jsonl"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to open missing.jsonl: not found");
    }
}
