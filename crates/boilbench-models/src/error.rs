//! Model error types.

use thiserror::Error;

/// Model and query errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the driver.
    #[error("models: {0}")]
    Driver(#[from] boilbench_mimic::Error),

    /// A column list names a column the table does not have.
    #[error("models: table {table:?} has no column {column:?}")]
    UnknownColumn { table: &'static str, column: String },

    /// An update resolved to an empty column set.
    #[error("models: unable to update {table}, could not build whitelist")]
    NoColumns { table: &'static str },
}

impl Error {
    /// Whether the error is the driver's "no rows" error.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Error::Driver(boilbench_mimic::Error::NoRows))
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;
