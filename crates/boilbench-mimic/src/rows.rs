//! Result cursors and row access.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::expectation::QueryResult;
use crate::value::{FromValue, Value};

/// Types that can be built from a single result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> Result<Self>;
}

/// A borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    pub fn new(columns: &'a [String], values: &'a [Value]) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `idx`.
    pub fn value(&self, idx: usize) -> Result<&'a Value> {
        self.values.get(idx).ok_or_else(|| {
            Error::decode(
                self.column_name(idx),
                format!("index {} out of range for {} values", idx, self.values.len()),
            )
        })
    }

    /// Decode the value at `idx`.
    pub fn get<T: FromValue>(&self, idx: usize) -> Result<T> {
        let value = self.value(idx)?;
        T::from_value(value).map_err(|reason| Error::decode(self.column_name(idx), reason))
    }

    /// Decode the value of the column called `name`.
    pub fn get_by_name<T: FromValue>(&self, name: &str) -> Result<T> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::decode(name, "no such column"))?;
        self.get(idx)
    }

    /// Position of the column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    fn column_name(&self, idx: usize) -> String {
        self.columns
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("#{}", idx))
    }
}

/// Cursor over a row-set.
///
/// Shares the registered row-set; iterating does not copy values.
#[derive(Debug, Clone)]
pub struct Rows {
    columns: Arc<[String]>,
    rows: Arc<[Vec<Value>]>,
    pos: usize,
}

impl Rows {
    /// Cursor over the rows of `result`, sharing its storage.
    pub fn from_result(result: &QueryResult) -> Self {
        Self {
            columns: Arc::clone(&result.columns),
            rows: Arc::clone(&result.rows),
            pos: 0,
        }
    }

    /// A cursor with no rows.
    pub fn empty(columns: &[String]) -> Self {
        Self {
            columns: columns.iter().cloned().collect(),
            rows: Arc::from(Vec::new()),
            pos: 0,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Total number of rows in the set.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len() - self.pos
    }

    /// Advance to the next row.
    pub fn next_row(&mut self) -> Option<Row<'_>> {
        let values = self.rows.get(self.pos)?;
        self.pos += 1;
        Some(Row::new(&self.columns, values))
    }

    /// Decode every remaining row.
    pub fn collect<T: FromRow>(mut self) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(self.remaining());
        while let Some(row) = self.next_row() {
            out.push(T::from_row(&row)?);
        }
        Ok(out)
    }

    /// Decode the next row, failing with [`Error::NoRows`] if there is none.
    pub fn one<T: FromRow>(mut self) -> Result<T> {
        match self.next_row() {
            Some(row) => T::from_row(&row),
            None => Err(Error::NoRows),
        }
    }
}

impl FromRow for Vec<Value> {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(row.values().to_vec())
    }
}

impl FromRow for i64 {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        row.get(0)
    }
}

impl FromRow for bool {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        row.get(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult::new(["id", "name", "color"])
            .with_row(vec![Value::Int64(1), Value::from("a"), Value::Null])
            .with_row(vec![Value::Int64(2), Value::from("b"), Value::from("red")])
    }

    #[test]
    fn test_row_access() {
        let mut rows = Rows::from_result(&sample());
        let row = rows.next_row().unwrap();

        assert_eq!(row.get::<i64>(0).unwrap(), 1);
        assert_eq!(row.get_by_name::<String>("name").unwrap(), "a");
        assert_eq!(row.get_by_name::<Option<String>>("color").unwrap(), None);
        assert_eq!(row.iter().count(), 3);
    }

    #[test]
    fn test_decode_errors_name_column() {
        let mut rows = Rows::from_result(&sample());
        let row = rows.next_row().unwrap();

        match row.get::<i64>(1) {
            Err(Error::Decode { column, .. }) => assert_eq!(column, "name"),
            other => panic!("unexpected {:?}", other),
        }
        match row.get_by_name::<i64>("missing") {
            Err(Error::Decode { column, .. }) => assert_eq!(column, "missing"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(row.value(10).is_err());
    }

    #[test]
    fn test_cursor_consumption() {
        let mut rows = Rows::from_result(&sample());
        assert_eq!(rows.len(), 2);
        assert!(rows.next_row().is_some());
        assert_eq!(rows.remaining(), 1);
        assert!(rows.next_row().is_some());
        assert!(rows.next_row().is_none());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_collect_and_one() {
        let ids = Rows::from_result(&sample()).collect::<i64>().unwrap();
        assert_eq!(ids, vec![1, 2]);

        let empty = Rows::empty(&["id".to_string()]);
        assert!(matches!(empty.one::<i64>(), Err(Error::NoRows)));
    }

    #[test]
    fn test_rows_share_result() {
        let result = sample();
        let rows = Rows::from_result(&result);
        assert!(Arc::ptr_eq(&rows.rows, &result.rows));
    }
}
