//! Column set selection for inserts and updates.

use crate::error::{Error, Result};

/// Which columns an insert or update should write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Columns {
    /// Derive the set from the table's defaults and the model's values.
    #[default]
    Infer,
    /// Exactly these columns.
    Whitelist(Vec<String>),
    /// The inferred set minus these columns.
    Blacklist(Vec<String>),
}

impl Columns {
    pub fn whitelist<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Columns::Whitelist(columns.into_iter().map(Into::into).collect())
    }

    pub fn blacklist<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Columns::Blacklist(columns.into_iter().map(Into::into).collect())
    }

    /// Cache key for statements rendered from this column set.
    pub fn cache_key(&self, non_zero_defaults: &[&str]) -> String {
        let (tag, list) = match self {
            Columns::Infer => ("infer", &[][..]),
            Columns::Whitelist(cols) => ("white", cols.as_slice()),
            Columns::Blacklist(cols) => ("black", cols.as_slice()),
        };
        let mut key = String::from(tag);
        for col in list {
            key.push(':');
            key.push_str(col);
        }
        key.push('|');
        key.push_str(&non_zero_defaults.join(","));
        key
    }

    /// Columns to insert and columns to read back with `RETURNING`.
    ///
    /// Inferred inserts write every column without a default plus each
    /// defaulted column holding a non-zero value; the remaining defaulted
    /// columns are returned.
    pub fn insert_column_set(
        &self,
        table: &'static str,
        all: &[&'static str],
        with_default: &[&'static str],
        non_zero_defaults: &[&str],
    ) -> Result<(Vec<String>, Vec<String>)> {
        let inferred = || {
            all.iter()
                .filter(|c| !with_default.contains(*c) || non_zero_defaults.contains(*c))
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
        };

        let insert = match self {
            Columns::Infer => inferred(),
            Columns::Whitelist(cols) => {
                validate(table, all, cols)?;
                cols.clone()
            }
            Columns::Blacklist(cols) => {
                validate(table, all, cols)?;
                inferred()
                    .into_iter()
                    .filter(|c| !cols.contains(c))
                    .collect()
            }
        };

        let returning = with_default
            .iter()
            .filter(|c| !insert.iter().any(|i| i == *c))
            .map(|c| c.to_string())
            .collect();

        Ok((insert, returning))
    }

    /// Columns an update should set. Primary keys are never set by inference.
    pub fn update_column_set(
        &self,
        table: &'static str,
        all: &[&'static str],
        primary_key: &[&'static str],
    ) -> Result<Vec<String>> {
        let non_key = || all.iter().filter(|c| !primary_key.contains(*c));

        match self {
            Columns::Infer => Ok(non_key().map(|c| c.to_string()).collect()),
            Columns::Whitelist(cols) => {
                validate(table, all, cols)?;
                Ok(cols.clone())
            }
            Columns::Blacklist(cols) => {
                validate(table, all, cols)?;
                Ok(non_key()
                    .filter(|c| !cols.iter().any(|b| b == *c))
                    .map(|c| c.to_string())
                    .collect())
            }
        }
    }
}

fn validate(table: &'static str, all: &[&'static str], cols: &[String]) -> Result<()> {
    match cols.iter().find(|c| !all.iter().any(|a| *a == c.as_str())) {
        Some(column) => Err(Error::UnknownColumn {
            table,
            column: column.clone(),
        }),
        None => Ok(()),
    }
}
