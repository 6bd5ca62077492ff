//! Table models.
//!
//! A [`Model`] describes one table: its name, columns, defaults and primary
//! key, plus how to read and write single fields. Everything else (insert
//! with column inference, upsert, update, delete, reload, find and typed
//! queries) is provided on top of that description. [`ModelQuery`] and
//! [`ModelSlice`] add the bulk variants.

use std::collections::HashMap;
use std::fmt::Write;
use std::marker::PhantomData;
use std::sync::Arc;

use boilbench_mimic::{Executor, FromRow, FromValue, Row, Value};
use parking_lot::RwLock;
use tracing::trace;

use crate::columns::Columns;
use crate::error::{Error, Result};
use crate::query::{qm, Query, QueryMod};

/// A statement rendered for a column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedStatement {
    pub query: String,
    /// Columns whose values are bound, in placeholder order.
    pub columns: Vec<String>,
    /// Columns read back after an insert.
    pub returning: Vec<String>,
}

/// Rendered statements keyed by column set.
#[derive(Debug, Default)]
pub struct StatementCache {
    entries: RwLock<HashMap<String, Arc<CachedStatement>>>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the statement cached under `key`, rendering it on a miss.
    pub fn get_or_try_insert<F>(&self, key: String, render: F) -> Result<Arc<CachedStatement>>
    where
        F: FnOnce() -> Result<CachedStatement>,
    {
        if let Some(stmt) = self.entries.read().get(&key) {
            return Ok(Arc::clone(stmt));
        }
        let stmt = Arc::new(render()?);
        self.entries.write().insert(key, Arc::clone(&stmt));
        Ok(stmt)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Quote an identifier with double quotes.
pub fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}

fn quote_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote(c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render `"a"=$n,"b"=$n+1` starting at placeholder `start`.
fn assignments(columns: &[String], start: usize, sep: &str) -> String {
    let mut out = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        let _ = write!(out, "\"{}\"=${}", col, start + i);
    }
    out
}

/// Render `("a"=$n AND "b"=$n+1) OR (..)` matching `count` rows by `columns`.
fn where_repeated(columns: &[&str], start: usize, count: usize) -> String {
    let mut out = String::new();
    let mut next = start;
    for i in 0..count {
        if i > 0 {
            out.push_str(" OR ");
        }
        out.push('(');
        for (j, col) in columns.iter().enumerate() {
            if j > 0 {
                out.push_str(" AND ");
            }
            let _ = write!(out, "\"{}\"=${}", col, next);
            next += 1;
        }
        out.push(')');
    }
    out
}

fn render_insert(table: &str, insert: &[String]) -> String {
    if insert.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote(table));
    }
    let placeholders = (1..=insert.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(table),
        quote_list(insert),
        placeholders
    )
}

/// Render an insert that resolves primary key or `conflict` collisions.
///
/// Without `update_on_conflict`, or with nothing to update, colliding rows
/// are left alone.
fn render_upsert(
    table: &str,
    insert: &[String],
    conflict: &[&str],
    update: &[String],
    returning: &[String],
    update_on_conflict: bool,
) -> String {
    let mut query = render_insert(table, insert);
    query.push_str(" ON CONFLICT ");
    if !update_on_conflict || update.is_empty() {
        query.push_str("DO NOTHING");
    } else {
        let target = conflict.iter().map(|c| quote(c)).collect::<Vec<_>>();
        let _ = write!(query, "({}) DO UPDATE SET ", target.join(", "));
        for (i, col) in update.iter().enumerate() {
            if i > 0 {
                query.push(',');
            }
            let _ = write!(query, "\"{0}\" = EXCLUDED.\"{0}\"", col);
        }
    }
    if !returning.is_empty() {
        let _ = write!(query, " RETURNING {}", quote_list(returning));
    }
    query
}

/// Check bulk update columns against the table, in order.
fn update_columns<M: Model>(columns: &[(&str, Value)]) -> Result<Vec<(String, Value)>> {
    if columns.is_empty() {
        return Err(Error::NoColumns { table: M::TABLE });
    }
    columns
        .iter()
        .map(|(column, value)| {
            if M::ALL_COLUMNS.iter().any(|c| c == column) {
                Ok((column.to_string(), value.clone()))
            } else {
                Err(Error::UnknownColumn {
                    table: M::TABLE,
                    column: column.to_string(),
                })
            }
        })
        .collect()
}

/// Assign every column of `row` to `model`.
pub fn scan_row<M: Model>(model: &mut M, row: &Row<'_>) -> boilbench_mimic::Result<()> {
    for (column, value) in row.iter() {
        model.set(column, value)?;
    }
    Ok(())
}

/// Build a model from a row bound by column name.
///
/// Columns missing from the row keep their default value.
pub fn bind_row<M: Model>(row: &Row<'_>) -> boilbench_mimic::Result<M> {
    let mut model = M::default();
    scan_row(&mut model, row)?;
    Ok(model)
}

/// Decode `value` for a field, naming `column` on failure.
pub fn decode_field<T: FromValue>(column: &str, value: &Value) -> boilbench_mimic::Result<T> {
    T::from_value(value).map_err(|reason| boilbench_mimic::Error::decode(column, reason))
}

/// Error for a row column the model has no field for.
pub fn unknown_field(table: &str, column: &str) -> boilbench_mimic::Error {
    boilbench_mimic::Error::decode(column, format!("no field for column in table {}", table))
}

/// A table model.
pub trait Model: FromRow + Default + Sized {
    /// Table name, unquoted.
    const TABLE: &'static str;
    /// Every column, in table order.
    const ALL_COLUMNS: &'static [&'static str];
    /// Columns the database fills in when omitted.
    const COLUMNS_WITH_DEFAULT: &'static [&'static str];
    const PRIMARY_KEY: &'static [&'static str];

    /// Value of `column`, or `None` for a column the model lacks.
    fn value(&self, column: &str) -> Option<Value>;

    /// Assign `column`. Unknown columns and mismatched values are decode errors.
    fn set(&mut self, column: &str, value: &Value) -> boilbench_mimic::Result<()>;

    fn insert_cache() -> &'static StatementCache;

    fn update_cache() -> &'static StatementCache;

    fn upsert_cache() -> &'static StatementCache;

    /// Values of the primary key columns.
    fn primary_key_values(&self) -> Vec<Value> {
        Self::PRIMARY_KEY
            .iter()
            .map(|c| self.value(c).unwrap_or(Value::Null))
            .collect()
    }

    /// Defaulted columns currently holding a non-zero value.
    fn non_zero_defaults(&self) -> Vec<&'static str> {
        Self::COLUMNS_WITH_DEFAULT
            .iter()
            .copied()
            .filter(|c| self.value(c).is_some_and(|v| !v.is_zero()))
            .collect()
    }

    /// Values for `columns`, in order.
    fn values_for(&self, columns: &[String]) -> Vec<Value> {
        columns
            .iter()
            .map(|c| self.value(c).unwrap_or(Value::Null))
            .collect()
    }

    /// Insert the model.
    ///
    /// Defaulted columns that are not written are read back and assigned.
    fn insert<E: Executor>(&mut self, exec: &E, columns: Columns) -> Result<()> {
        let nz_defaults = self.non_zero_defaults();
        let key = columns.cache_key(&nz_defaults);
        let stmt = Self::insert_cache().get_or_try_insert(key, || {
            let (insert, returning) = columns.insert_column_set(
                Self::TABLE,
                Self::ALL_COLUMNS,
                Self::COLUMNS_WITH_DEFAULT,
                &nz_defaults,
            )?;
            let mut query = render_insert(Self::TABLE, &insert);
            if !returning.is_empty() {
                let _ = write!(query, " RETURNING {}", quote_list(&returning));
            }
            Ok(CachedStatement {
                query,
                columns: insert,
                returning,
            })
        })?;

        let args = self.values_for(&stmt.columns);
        trace!(table = Self::TABLE, query = %stmt.query, "insert");

        if stmt.returning.is_empty() {
            exec.exec(&stmt.query, &args)?;
        } else {
            let mut rows = exec.query(&stmt.query, &args)?;
            let row = rows.next_row().ok_or(boilbench_mimic::Error::NoRows)?;
            scan_row(self, &row)?;
        }
        Ok(())
    }

    /// Insert the model, or resolve a collision on `conflict` columns.
    ///
    /// An empty `conflict` means the primary key. With `update_on_conflict`
    /// the colliding row gets the `update` columns from the new values,
    /// otherwise it is left alone. Defaulted columns are read back when the
    /// statement returns a row.
    fn upsert<E: Executor>(
        &mut self,
        exec: &E,
        update_on_conflict: bool,
        conflict: &[&str],
        update: Columns,
        insert: Columns,
    ) -> Result<()> {
        let nz_defaults = self.non_zero_defaults();
        let key = format!(
            "{}|{}|{}|{}",
            if update_on_conflict { 't' } else { 'f' },
            conflict.join(","),
            update.cache_key(&[]),
            insert.cache_key(&nz_defaults)
        );
        let stmt = Self::upsert_cache().get_or_try_insert(key, || {
            let (insert, returning) = insert.insert_column_set(
                Self::TABLE,
                Self::ALL_COLUMNS,
                Self::COLUMNS_WITH_DEFAULT,
                &nz_defaults,
            )?;
            let update = update.update_column_set(
                Self::TABLE,
                Self::ALL_COLUMNS,
                Self::PRIMARY_KEY,
            )?;
            if update_on_conflict && update.is_empty() {
                return Err(Error::NoColumns { table: Self::TABLE });
            }
            let conflict = if conflict.is_empty() {
                Self::PRIMARY_KEY
            } else {
                conflict
            };
            let query = render_upsert(
                Self::TABLE,
                &insert,
                conflict,
                &update,
                &returning,
                update_on_conflict,
            );
            Ok(CachedStatement {
                query,
                columns: insert,
                returning,
            })
        })?;

        let args = self.values_for(&stmt.columns);
        trace!(table = Self::TABLE, query = %stmt.query, "upsert");

        if stmt.returning.is_empty() {
            exec.exec(&stmt.query, &args)?;
        } else {
            // DO NOTHING on a collision returns no row.
            let mut rows = exec.query(&stmt.query, &args)?;
            if let Some(row) = rows.next_row() {
                scan_row(self, &row)?;
            }
        }
        Ok(())
    }

    /// Update the model's row, returning the rows affected.
    fn update<E: Executor>(&self, exec: &E, columns: Columns) -> Result<u64> {
        let key = columns.cache_key(&[]);
        let stmt = Self::update_cache().get_or_try_insert(key, || {
            let set = columns.update_column_set(
                Self::TABLE,
                Self::ALL_COLUMNS,
                Self::PRIMARY_KEY,
            )?;
            if set.is_empty() {
                return Err(Error::NoColumns { table: Self::TABLE });
            }
            let pk: Vec<String> = Self::PRIMARY_KEY.iter().map(|c| c.to_string()).collect();
            let query = format!(
                "UPDATE {} SET {} WHERE {}",
                quote(Self::TABLE),
                assignments(&set, 1, ","),
                assignments(&pk, set.len() + 1, " AND ")
            );
            Ok(CachedStatement {
                query,
                columns: set,
                returning: Vec::new(),
            })
        })?;

        let mut args = self.values_for(&stmt.columns);
        args.extend(self.primary_key_values());
        trace!(table = Self::TABLE, query = %stmt.query, "update");

        Ok(exec.exec(&stmt.query, &args)?.rows_affected())
    }

    /// Delete the model's row, returning the rows affected.
    fn delete<E: Executor>(&self, exec: &E) -> Result<u64> {
        let pk: Vec<String> = Self::PRIMARY_KEY.iter().map(|c| c.to_string()).collect();
        let query = format!(
            "DELETE FROM {} WHERE {}",
            quote(Self::TABLE),
            assignments(&pk, 1, " AND ")
        );
        Ok(exec.exec(&query, &self.primary_key_values())?.rows_affected())
    }

    /// Re-read the model's row.
    fn reload<E: Executor>(&mut self, exec: &E) -> Result<()> {
        *self = Self::find(exec, self.primary_key_values(), &[])?;
        Ok(())
    }

    /// Find a row by primary key. Empty `select` reads every column.
    fn find<E: Executor>(exec: &E, key: Vec<Value>, select: &[&str]) -> Result<Self> {
        let sel = if select.is_empty() {
            "*".to_string()
        } else {
            select
                .iter()
                .map(|c| quote(c))
                .collect::<Vec<_>>()
                .join(",")
        };
        let pk: Vec<String> = Self::PRIMARY_KEY.iter().map(|c| c.to_string()).collect();
        let query = format!(
            "select {} from {} where {}",
            sel,
            quote(Self::TABLE),
            assignments(&pk, 1, " AND ")
        );
        Ok(exec.query_one(&query, &key)?)
    }

    /// Check whether a row with the primary key exists.
    fn exists<E: Executor>(exec: &E, key: Vec<Value>) -> Result<bool> {
        let pk: Vec<String> = Self::PRIMARY_KEY.iter().map(|c| c.to_string()).collect();
        let query = format!(
            "select exists(select 1 from {} where {} limit 1)",
            quote(Self::TABLE),
            assignments(&pk, 1, " AND ")
        );
        Ok(exec.query_one(&query, &key)?)
    }

    /// Start a query on this table.
    fn query(mods: impl IntoIterator<Item = QueryMod>) -> ModelQuery<Self> {
        let mut query = Query::new([qm::from(quote(Self::TABLE))]);
        query.apply(mods);
        ModelQuery::new(query)
    }
}

/// A query returning rows of one model.
#[derive(Debug, Clone)]
pub struct ModelQuery<M> {
    query: Query,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> ModelQuery<M> {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            _model: PhantomData,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    /// Every matching row.
    pub fn all<E: Executor>(&self, exec: &E) -> Result<Vec<M>> {
        self.query.bind_all(exec)
    }

    /// The first matching row.
    pub fn one<E: Executor>(&self, exec: &E) -> Result<M> {
        let mut query = self.query.clone();
        query.set_limit(1);
        query.bind_one(exec)
    }

    /// Number of matching rows.
    pub fn count<E: Executor>(&self, exec: &E) -> Result<i64> {
        let mut query = self.query.clone();
        query.set_count(true);
        query.bind_one(exec)
    }

    /// Whether any row matches.
    pub fn exists<E: Executor>(&self, exec: &E) -> Result<bool> {
        let mut query = self.query.clone();
        query.set_count(true);
        query.set_limit(1);
        let count: i64 = query.bind_one(exec)?;
        Ok(count > 0)
    }

    /// Set `columns` on every matching row, returning the rows affected.
    pub fn update_all<E: Executor>(&self, exec: &E, columns: &[(&str, Value)]) -> Result<u64> {
        let mut query = self.query.clone();
        query.set_update(update_columns::<M>(columns)?);
        Ok(query.exec(exec)?.rows_affected())
    }

    /// Delete every matching row, returning the rows affected.
    pub fn delete_all<E: Executor>(&self, exec: &E) -> Result<u64> {
        let mut query = self.query.clone();
        query.set_delete();
        Ok(query.exec(exec)?.rows_affected())
    }
}

/// Bulk operations over loaded models, matched by primary key.
pub trait ModelSlice {
    /// Set `columns` on each model's row, returning the rows affected.
    fn update_all<E: Executor>(&self, exec: &E, columns: &[(&str, Value)]) -> Result<u64>;

    /// Delete each model's row, returning the rows affected.
    fn delete_all<E: Executor>(&self, exec: &E) -> Result<u64>;

    /// Re-read every model in one query. A row missing from the result is
    /// [`boilbench_mimic::Error::NoRows`].
    fn reload_all<E: Executor>(&mut self, exec: &E) -> Result<()>;
}

impl<M: Model> ModelSlice for [M] {
    fn update_all<E: Executor>(&self, exec: &E, columns: &[(&str, Value)]) -> Result<u64> {
        if self.is_empty() {
            return Ok(0);
        }
        let columns = update_columns::<M>(columns)?;
        let set: Vec<String> = columns.iter().map(|(c, _)| c.clone()).collect();
        let query = format!(
            "UPDATE {} SET {} WHERE {}",
            quote(M::TABLE),
            assignments(&set, 1, ","),
            where_repeated(M::PRIMARY_KEY, set.len() + 1, self.len())
        );

        let mut args: Vec<Value> = columns.into_iter().map(|(_, v)| v).collect();
        args.extend(self.iter().flat_map(M::primary_key_values));
        trace!(table = M::TABLE, query = %query, "update all");

        Ok(exec.exec(&query, &args)?.rows_affected())
    }

    fn delete_all<E: Executor>(&self, exec: &E) -> Result<u64> {
        if self.is_empty() {
            return Ok(0);
        }
        let query = format!(
            "DELETE FROM {} WHERE {}",
            quote(M::TABLE),
            where_repeated(M::PRIMARY_KEY, 1, self.len())
        );
        let args: Vec<Value> = self.iter().flat_map(M::primary_key_values).collect();
        trace!(table = M::TABLE, query = %query, "delete all");

        Ok(exec.exec(&query, &args)?.rows_affected())
    }

    fn reload_all<E: Executor>(&mut self, exec: &E) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let query = format!(
            "SELECT {}.* FROM {} WHERE {}",
            quote(M::TABLE),
            quote(M::TABLE),
            where_repeated(M::PRIMARY_KEY, 1, self.len())
        );
        let args: Vec<Value> = self.iter().flat_map(M::primary_key_values).collect();
        let mut found: Vec<M> = exec.query_all(&query, &args)?;

        for model in self.iter_mut() {
            let key = model.primary_key_values();
            let pos = found
                .iter()
                .position(|f| f.primary_key_values() == key)
                .ok_or(boilbench_mimic::Error::NoRows)?;
            *model = found.swap_remove(pos);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignments() {
        let cols = vec!["name".to_string(), "color".to_string()];
        assert_eq!(assignments(&cols, 1, ","), "\"name\"=$1,\"color\"=$2");
        assert_eq!(
            assignments(&cols, 3, " AND "),
            "\"name\"=$3 AND \"color\"=$4"
        );
    }

    #[test]
    fn test_where_repeated() {
        assert_eq!(where_repeated(&["id"], 2, 2), "(\"id\"=$2) OR (\"id\"=$3)");
        assert_eq!(
            where_repeated(&["a", "b"], 1, 2),
            "(\"a\"=$1 AND \"b\"=$2) OR (\"a\"=$3 AND \"b\"=$4)"
        );
    }

    #[test]
    fn test_render_upsert() {
        let insert = vec!["id".to_string(), "name".to_string()];
        let update = vec!["name".to_string()];
        let returning = vec!["color".to_string()];

        assert_eq!(
            render_upsert("jets", &insert, &["id"], &update, &returning, true),
            "INSERT INTO \"jets\" (\"id\",\"name\") VALUES ($1,$2) ON CONFLICT (\"id\") \
             DO UPDATE SET \"name\" = EXCLUDED.\"name\" RETURNING \"color\""
        );
        assert_eq!(
            render_upsert("jets", &insert, &["id"], &update, &[], false),
            "INSERT INTO \"jets\" (\"id\",\"name\") VALUES ($1,$2) ON CONFLICT DO NOTHING"
        );
        assert_eq!(
            render_upsert("jets", &[], &["id"], &[], &[], true),
            "INSERT INTO \"jets\" DEFAULT VALUES ON CONFLICT DO NOTHING"
        );
    }

    #[test]
    fn test_statement_cache_renders_once() {
        let cache = StatementCache::new();
        let mut renders = 0;

        for _ in 0..3 {
            let stmt = cache
                .get_or_try_insert("k".to_string(), || {
                    renders += 1;
                    Ok(CachedStatement {
                        query: "q".into(),
                        columns: vec![],
                        returning: vec![],
                    })
                })
                .unwrap();
            assert_eq!(stmt.query, "q");
        }

        assert_eq!(renders, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_statement_cache_skips_failed_render() {
        let cache = StatementCache::new();
        let result = cache.get_or_try_insert("k".to_string(), || {
            Err(Error::NoColumns { table: "jets" })
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
