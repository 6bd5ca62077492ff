//! Driver error types.

use thiserror::Error;

/// Driver errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No expectation is registered for the DSN (or the default key).
    #[error("mimic: no expectation registered for dsn {dsn:?}")]
    NoExpectation { dsn: String },

    /// No driver is registered under the requested name.
    #[error("unknown driver {0:?} (forgotten import?)")]
    UnknownDriver(String),

    /// A driver is already registered under this name.
    #[error("driver {0:?} is already registered")]
    DriverExists(String),

    /// Statement was called with the wrong number of arguments.
    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// The registered expectation is of the other kind.
    #[error("mimic: statement called as {expected} but expectation is {found}")]
    ExpectationMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The result set had no rows.
    #[error("no rows in result set")]
    NoRows,

    /// A column value could not be converted.
    #[error("decode error on column {column:?}: {reason}")]
    Decode { column: String, reason: String },

    /// Operation not supported by this driver.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Connection has been closed.
    #[error("connection is closed")]
    Closed,

    /// Transaction already committed or rolled back.
    #[error("transaction has already been committed or rolled back")]
    TransactionDone,
}

impl Error {
    /// Build a decode error for `column`.
    pub fn decode(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Decode {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, Error>;
