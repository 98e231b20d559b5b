//! Error types for litequery

use thiserror::Error;

/// Result type alias for litequery operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum QbError {
    /// Field string is empty or does not follow `column` / `column__lookup`
    #[error("Invalid field specification '{field}': {reason}")]
    InvalidFieldSpecification { field: String, reason: &'static str },

    /// Value shape does not match what the lookup expects
    #[error("Invalid value for lookup '{lookup}': expected {expected}, found {found}")]
    InvalidLookupValue {
        lookup: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Lookup suffix is not one of the recognized lookups
    #[error("Unsupported lookup '{lookup}' in field '{field}'")]
    UnsupportedLookup { field: String, lookup: String },

    /// SELECT was given an empty column list
    #[error("SELECT requires at least one column")]
    EmptyColumnList,

    /// Execution was attempted before a SELECT/DELETE base was chosen
    #[error("No base statement: call select/select_from/delete_from first")]
    MissingStatement,

    /// The database handle has been closed
    #[error("Database connection is closed")]
    ConnectionClosed,

    /// Database could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error reported by SQLite
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Blocking execution task failed to complete
    #[error("Execution task failed: {0}")]
    Task(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row has no column with this name
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

impl QbError {
    /// Create an invalid field specification error
    pub fn invalid_field(field: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFieldSpecification {
            field: field.into(),
            reason,
        }
    }

    /// Create an unsupported lookup error
    pub fn unsupported_lookup(field: impl Into<String>, lookup: impl Into<String>) -> Self {
        Self::UnsupportedLookup {
            field: field.into(),
            lookup: lookup.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this error was raised while compiling a condition
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFieldSpecification { .. }
                | Self::InvalidLookupValue { .. }
                | Self::UnsupportedLookup { .. }
        )
    }

    /// Check if this error came from the database engine
    pub fn is_sqlite(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }

    /// Check if this is a closed connection error
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }

    /// Check if SQLite rejected a write on a read-only connection
    pub fn is_read_only(&self) -> bool {
        match self {
            Self::Sqlite(err) => err.sqlite_error_code() == Some(rusqlite::ErrorCode::ReadOnly),
            _ => false,
        }
    }

    /// Check if SQLite rejected the statement because of a constraint
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Sqlite(err) => {
                err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
            }
            _ => false,
        }
    }
}
