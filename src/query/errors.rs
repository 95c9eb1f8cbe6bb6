//! Query engine error types
//!
//! Every error is fatal for the call that raised it; the engine never
//! retries. Schema and storage failures pass through untranslated.

use thiserror::Error;

use crate::schema::SchemaError;
use crate::storage::StorageError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query engine errors
#[derive(Debug, Error)]
pub enum QueryError {
    /// Comparator token is malformed or not one of `= == === < > <= >=`
    #[error("The comparator must be a valid comparison sign, got '{0}'")]
    InvalidComparator(String),

    /// Predicate value is neither a number nor a string
    #[error("The predicate value must be either a number or a string, got {0}")]
    InvalidValueType(String),

    /// Insert input is neither a row collection nor a record collection
    #[error("Data to be inserted must be a collection of rows or records, got {0}")]
    InvalidInputShape(String),

    /// No key is left after the table's current maximum
    #[error("No primary key is left after {0}")]
    KeyExhausted(u64),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QueryError {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidComparator(_) => "JSONTABLE_INVALID_COMPARATOR",
            QueryError::InvalidValueType(_) => "JSONTABLE_INVALID_VALUE_TYPE",
            QueryError::InvalidInputShape(_) => "JSONTABLE_INVALID_INPUT_SHAPE",
            QueryError::KeyExhausted(_) => "JSONTABLE_PRIMARY_KEY_EXHAUSTED",
            QueryError::Schema(e) => e.code().code(),
            QueryError::Storage(e) => e.code().code(),
        }
    }

    /// Returns the underlying I/O error, if the failure came from the file system
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            QueryError::Storage(e) => e.io_error(),
            _ => None,
        }
    }
}
