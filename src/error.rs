use std::time::Duration;

use thiserror::Error;

use crate::types::SqlType;

/// Error type for querykit operations
#[derive(Debug, Error)]
pub enum QueryKitError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Expected {expected} column(s), got {actual}")]
    IncorrectColumnCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column index {index} out of range for row with {len} column(s)")]
    ColumnIndexOutOfRange { index: usize, len: usize },

    #[error("Cannot convert {actual} value to {expected:?}")]
    TypeMismatch { expected: SqlType, actual: String },

    #[error("Unexpected NULL value for non-optional {0:?}")]
    UnexpectedNull(SqlType),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Result set cursor is not positioned on a row")]
    NoCurrentRow,

    #[error("Row mapping failed: {0}")]
    Mapping(String),
}

/// Result type alias for querykit operations
pub type Result<T> = std::result::Result<T, QueryKitError>;
