//! Error types for the ambient surfaces of recordql
//!
//! The query operators themselves never fail. Errors only arise while
//! loading configuration and moving records across the JSON Lines boundary.
//!
//! Error codes:
//! - RQL_CONFIG_INVALID (ERROR)
//! - RQL_IO_FAILED (ERROR)
//! - RQL_JSON_INVALID (ERROR)

use std::fmt;
use std::io;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The input or configuration was rejected; nothing was produced
    Error,
    /// Output may be partial
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Error codes with stable string forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Configuration file unreadable or invalid
    RqlConfigInvalid,
    /// Reading input or writing output failed
    RqlIoFailed,
    /// JSON could not be parsed or serialized
    RqlJsonInvalid,
}

impl QueryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::RqlConfigInvalid => "RQL_CONFIG_INVALID",
            QueryErrorCode::RqlIoFailed => "RQL_IO_FAILED",
            QueryErrorCode::RqlJsonInvalid => "RQL_JSON_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            QueryErrorCode::RqlIoFailed => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error with code, message and optional underlying cause
#[derive(Debug)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl QueryError {
    /// Create a configuration error
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::RqlConfigInvalid,
            message: reason.into(),
            source: None,
        }
    }

    /// Create an I/O error
    pub fn io_failed(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::RqlIoFailed,
            message: reason.into(),
            source: None,
        }
    }

    /// Create a JSON error
    pub fn json_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::RqlJsonInvalid,
            message: reason.into(),
            source: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for QueryError {
    fn from(err: io::Error) -> Self {
        QueryError::io_failed(err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return QueryError::io_failed(err.to_string()).with_source(err);
        }
        QueryError::json_invalid(err.to_string()).with_source(err)
    }
}

/// Result type for fallible recordql operations
pub type QueryResult<T> = Result<T, QueryError>;
