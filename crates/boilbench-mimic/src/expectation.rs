//! Canned results returned by mimic statements.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::Value;

/// Row-set returned by every `query` on a matching connection.
///
/// Columns and rows are reference counted so handing the set to a
/// [`Rows`](crate::Rows) cursor never copies it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Expected argument count. `None` skips validation.
    pub num_input: Option<usize>,
    pub(crate) columns: Arc<[String]>,
    pub(crate) rows: Arc<[Vec<Value>]>,
}

impl QueryResult {
    /// Create an empty row-set with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            num_input: None,
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Arc::from(Vec::new()),
        }
    }

    /// Replace the rows.
    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = Arc::from(rows);
        self
    }

    /// Append a single row.
    pub fn with_row(self, row: Vec<Value>) -> Self {
        let mut rows = self.rows.to_vec();
        rows.push(row);
        self.with_rows(rows)
    }

    /// Replace the columns, keeping the rows.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Validate that statements are called with exactly `n` arguments.
    pub fn with_num_input(mut self, n: usize) -> Self {
        self.num_input = Some(n);
        self
    }

    /// Accept any number of arguments.
    pub fn any_input(mut self) -> Self {
        self.num_input = None;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result returned by every `exec` on a matching connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    /// Expected argument count. `None` skips validation.
    pub num_input: Option<usize>,
    pub rows_affected: u64,
    pub insert_id: Option<i64>,
}

impl ExecResult {
    /// Create a result reporting `rows_affected` rows.
    pub fn new(rows_affected: u64) -> Self {
        Self {
            num_input: None,
            rows_affected,
            insert_id: None,
        }
    }

    /// Report a last insert id.
    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.insert_id = Some(id);
        self
    }

    /// Validate that statements are called with exactly `n` arguments.
    pub fn with_num_input(mut self, n: usize) -> Self {
        self.num_input = Some(n);
        self
    }

    /// Accept any number of arguments.
    pub fn any_input(mut self) -> Self {
        self.num_input = None;
        self
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// The last inserted id, if one was configured.
    pub fn last_insert_id(&self) -> Result<i64> {
        self.insert_id
            .ok_or(Error::Unsupported("LastInsertId is not supported by this driver"))
    }
}

/// A registered expectation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Row-set for `query` calls.
    Query(QueryResult),
    /// Result for `exec` calls.
    Exec(ExecResult),
}

impl Expectation {
    pub fn kind(&self) -> &'static str {
        match self {
            Expectation::Query(_) => "query",
            Expectation::Exec(_) => "exec",
        }
    }

    pub fn num_input(&self) -> Option<usize> {
        match self {
            Expectation::Query(q) => q.num_input,
            Expectation::Exec(e) => e.num_input,
        }
    }

    pub fn as_query(&self) -> Result<&QueryResult> {
        match self {
            Expectation::Query(q) => Ok(q),
            other => Err(Error::ExpectationMismatch {
                expected: "query",
                found: other.kind(),
            }),
        }
    }

    pub fn as_exec(&self) -> Result<&ExecResult> {
        match self {
            Expectation::Exec(e) => Ok(e),
            other => Err(Error::ExpectationMismatch {
                expected: "exec",
                found: other.kind(),
            }),
        }
    }
}

impl From<QueryResult> for Expectation {
    fn from(q: QueryResult) -> Self {
        Expectation::Query(q)
    }
}

impl From<ExecResult> for Expectation {
    fn from(e: ExecResult) -> Self {
        Expectation::Exec(e)
    }
}
