//! Query modifiers and SQL rendering.
//!
//! A [`Query`] is built from a list of [`QueryMod`]s and rendered to
//! Postgres-style SQL. Clauses are written with `?` placeholders which are
//! rewritten to `$1..$n` in the order they appear in the final statement.
//!
//! ```
//! use boilbench_models::query::{qm, Query};
//!
//! let query = Query::new([
//!     qm::select(["id, name"]),
//!     qm::from("\"jets\""),
//!     qm::where_("id > ?", [1]),
//!     qm::and("name <> ?", ["thing"]),
//!     qm::limit(1),
//! ]);
//! let (sql, args) = query.build();
//! assert_eq!(
//!     sql,
//!     "SELECT id, name FROM \"jets\" WHERE (id > $1) AND (name <> $2) LIMIT 1;"
//! );
//! assert_eq!(args.len(), 2);
//! ```

use std::fmt::Write;

use boilbench_mimic::{ExecResult, Executor, FromRow, Value};

use crate::error::Result;

/// How a where clause joins the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
struct WhereClause {
    conjunction: Conjunction,
    clause: String,
    args: Vec<Value>,
}

/// A single change to a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMod {
    Select(Vec<String>),
    From(String),
    InnerJoin(String, Vec<Value>),
    Where(Conjunction, String, Vec<Value>),
    GroupBy(String),
    OrderBy(String),
    Limit(u64),
    Offset(u64),
}

impl QueryMod {
    /// Apply this modifier to `query`.
    pub fn apply(self, query: &mut Query) {
        match self {
            QueryMod::Select(columns) => query.select.extend(columns),
            QueryMod::From(from) => query.from.push(from),
            QueryMod::InnerJoin(clause, args) => query.joins.push((clause, args)),
            QueryMod::Where(conjunction, clause, args) => query.wheres.push(WhereClause {
                conjunction,
                clause,
                args,
            }),
            QueryMod::GroupBy(clause) => query.group_by.push(clause),
            QueryMod::OrderBy(clause) => query.order_by.push(clause),
            QueryMod::Limit(limit) => query.limit = Some(limit),
            QueryMod::Offset(offset) => query.offset = Some(offset),
        }
    }
}

/// Constructors for [`QueryMod`]s.
pub mod qm {
    use super::{Conjunction, QueryMod, Value};

    fn values<I, V>(args: I) -> Vec<Value>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        args.into_iter().map(Into::into).collect()
    }

    /// Select the given columns. Each argument is copied verbatim.
    pub fn select<I, S>(columns: I) -> QueryMod
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryMod::Select(columns.into_iter().map(Into::into).collect())
    }

    pub fn from(from: impl Into<String>) -> QueryMod {
        QueryMod::From(from.into())
    }

    pub fn inner_join<I, V>(clause: impl Into<String>, args: I) -> QueryMod
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        QueryMod::InnerJoin(clause.into(), values(args))
    }

    /// Add a where clause joined with `AND`.
    pub fn where_<I, V>(clause: impl Into<String>, args: I) -> QueryMod
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        QueryMod::Where(Conjunction::And, clause.into(), values(args))
    }

    /// Same as [`where_`]; reads better after the first clause.
    pub fn and<I, V>(clause: impl Into<String>, args: I) -> QueryMod
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        where_(clause, args)
    }

    /// Add a where clause joined with `OR`.
    pub fn or<I, V>(clause: impl Into<String>, args: I) -> QueryMod
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        QueryMod::Where(Conjunction::Or, clause.into(), values(args))
    }

    /// Add `clause` with its single `?` expanded to one placeholder per value.
    ///
    /// `qm::where_in("id in ?", [1, 2])` renders `(id in ($1,$2))`.
    pub fn where_in<I, V>(clause: &str, args: I) -> QueryMod
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args = values(args);
        let list = format!("({})", vec!["?"; args.len()].join(","));
        QueryMod::Where(Conjunction::And, clause.replacen('?', &list, 1), args)
    }

    pub fn group_by(clause: impl Into<String>) -> QueryMod {
        QueryMod::GroupBy(clause.into())
    }

    pub fn order_by(clause: impl Into<String>) -> QueryMod {
        QueryMod::OrderBy(clause.into())
    }

    pub fn limit(limit: u64) -> QueryMod {
        QueryMod::Limit(limit)
    }

    pub fn offset(offset: u64) -> QueryMod {
        QueryMod::Offset(offset)
    }
}

/// Statement a [`Query`] renders to.
#[derive(Debug, Clone, Default, PartialEq)]
enum Kind {
    #[default]
    Select,
    /// `UPDATE` setting these columns.
    Update(Vec<(String, Value)>),
    Delete,
}

/// A query under construction. Renders a select unless switched to an
/// update or delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    kind: Kind,
    select: Vec<String>,
    from: Vec<String>,
    joins: Vec<(String, Vec<Value>)>,
    wheres: Vec<WhereClause>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    count: bool,
}

impl Query {
    /// Build a query from modifiers, applied in order.
    pub fn new(mods: impl IntoIterator<Item = QueryMod>) -> Self {
        let mut query = Self::default();
        query.apply(mods);
        query
    }

    /// Apply more modifiers.
    pub fn apply(&mut self, mods: impl IntoIterator<Item = QueryMod>) {
        for m in mods {
            m.apply(self);
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.select
    }

    /// Replace the select list.
    pub fn set_select(&mut self, columns: Vec<String>) {
        self.select = columns;
    }

    /// Replace the from list.
    pub fn set_from(&mut self, from: impl Into<String>) {
        self.from = vec![from.into()];
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    /// Render as `SELECT COUNT(*)` instead of the select list.
    pub fn set_count(&mut self, count: bool) {
        self.count = count;
    }

    /// Render as `UPDATE .. SET` with `columns`, keeping the where clauses.
    pub fn set_update(&mut self, columns: Vec<(String, Value)>) {
        self.kind = Kind::Update(columns);
    }

    /// Render as `DELETE FROM`, keeping the where clauses.
    pub fn set_delete(&mut self) {
        self.kind = Kind::Delete;
    }

    /// Render the SQL and collect arguments in placeholder order.
    pub fn build(&self) -> (String, Vec<Value>) {
        match &self.kind {
            Kind::Select => self.build_select(),
            Kind::Update(columns) => self.build_update(columns),
            Kind::Delete => self.build_delete(),
        }
    }

    fn build_update(&self, columns: &[(String, Value)]) -> (String, Vec<Value>) {
        let mut sql = String::with_capacity(64);
        let mut args = Vec::with_capacity(columns.len());
        let mut placeholder = 1;

        sql.push_str("UPDATE ");
        sql.push_str(&self.from.join(", "));
        sql.push_str(" SET ");
        for (i, (column, value)) in columns.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            let _ = write!(sql, "\"{}\"=${}", column, placeholder);
            placeholder += 1;
            args.push(value.clone());
        }
        self.write_wheres(&mut sql, &mut args, &mut placeholder);
        sql.push(';');
        (sql, args)
    }

    fn build_delete(&self) -> (String, Vec<Value>) {
        let mut sql = String::with_capacity(64);
        let mut args = Vec::new();
        let mut placeholder = 1;

        sql.push_str("DELETE FROM ");
        sql.push_str(&self.from.join(", "));
        self.write_wheres(&mut sql, &mut args, &mut placeholder);
        sql.push(';');
        (sql, args)
    }

    fn write_wheres(&self, sql: &mut String, args: &mut Vec<Value>, placeholder: &mut usize) {
        for (i, clause) in self.wheres.iter().enumerate() {
            if i == 0 {
                sql.push_str(" WHERE (");
            } else {
                match clause.conjunction {
                    Conjunction::And => sql.push_str(" AND ("),
                    Conjunction::Or => sql.push_str(" OR ("),
                }
            }
            write_clause(sql, &clause.clause, placeholder);
            sql.push(')');
            args.extend(clause.args.iter().cloned());
        }
    }

    fn build_select(&self) -> (String, Vec<Value>) {
        let mut sql = String::with_capacity(64);
        let mut args = Vec::new();
        let mut placeholder = 1;

        sql.push_str("SELECT ");
        if self.count {
            sql.push_str("COUNT(*)");
        } else if self.select.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select.join(", "));
        }

        if !self.from.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&self.from.join(", "));
        }

        for (clause, join_args) in &self.joins {
            sql.push_str(" INNER JOIN ");
            write_clause(&mut sql, clause, &mut placeholder);
            args.extend(join_args.iter().cloned());
        }

        self.write_wheres(&mut sql, &mut args, &mut placeholder);

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {}", limit);
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {}", offset);
        }

        sql.push(';');
        (sql, args)
    }

    /// Run the query and decode every row.
    pub fn bind_all<T: FromRow, E: Executor>(&self, exec: &E) -> Result<Vec<T>> {
        let (sql, args) = self.build();
        Ok(exec.query_all(&sql, &args)?)
    }

    /// Run the query and decode the first row.
    pub fn bind_one<T: FromRow, E: Executor>(&self, exec: &E) -> Result<T> {
        let (sql, args) = self.build();
        Ok(exec.query_one(&sql, &args)?)
    }

    /// Run the query for its side effects.
    pub fn exec<E: Executor>(&self, exec: &E) -> Result<ExecResult> {
        let (sql, args) = self.build();
        Ok(exec.exec(&sql, &args)?)
    }
}

/// Copy `clause` into `sql`, numbering `?` placeholders from `next`.
fn write_clause(sql: &mut String, clause: &str, next: &mut usize) {
    for ch in clause.chars() {
        if ch == '?' {
            let _ = write!(sql, "${}", next);
            *next += 1;
        } else {
            sql.push(ch);
        }
    }
}

/// Rewrite `?` placeholders in `sql` to `$1..$n`.
pub fn rebind(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut next = 1;
    write_clause(&mut out, sql, &mut next);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all() {
        let (sql, args) = Query::new([qm::from("\"jets\"")]).build();
        assert_eq!(sql, "SELECT * FROM \"jets\";");
        assert!(args.is_empty());
    }

    #[test]
    fn test_complex_query() {
        let query = Query::new([
            qm::select(["id, name, color, uuid, identifier, cargo, manifest"]),
            qm::from("\"jets\""),
            qm::where_("id > ?", [1]),
            qm::and("name <> ?", ["thing"]),
            qm::limit(1),
            qm::group_by("id"),
            qm::offset(1),
        ]);

        let (sql, args) = query.build();
        assert_eq!(
            sql,
            "SELECT id, name, color, uuid, identifier, cargo, manifest FROM \"jets\" \
             WHERE (id > $1) AND (name <> $2) GROUP BY id LIMIT 1 OFFSET 1;"
        );
        assert_eq!(args, vec![Value::Int64(1), Value::from("thing")]);
    }

    #[test]
    fn test_or_and_where_in() {
        let query = Query::new([
            qm::from("\"jets\""),
            qm::where_in("\"jets\".\"airport_id\" in ?", [3i64, 4, 5]),
            qm::or("name = ?", ["a"]),
        ]);

        let (sql, args) = query.build();
        assert_eq!(
            sql,
            "SELECT * FROM \"jets\" WHERE (\"jets\".\"airport_id\" in ($1,$2,$3)) OR (name = $4);"
        );
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_join_placeholders_come_first() {
        let query = Query::new([
            qm::from("\"jets\""),
            qm::inner_join("airports a on a.id = jets.airport_id and a.size > ?", [10]),
            qm::where_("jets.id = ?", [1]),
        ]);

        let (sql, args) = query.build();
        assert!(sql.contains("a.size > $1"));
        assert!(sql.contains("(jets.id = $2)"));
        assert_eq!(args, vec![Value::Int64(10), Value::Int64(1)]);
    }

    #[test]
    fn test_count_ignores_select() {
        let mut query = Query::new([qm::select(["id"]), qm::from("\"airports\"")]);
        query.set_count(true);
        query.set_limit(1);
        assert_eq!(
            query.build().0,
            "SELECT COUNT(*) FROM \"airports\" LIMIT 1;"
        );
    }

    #[test]
    fn test_order_by() {
        let query = Query::new([
            qm::from("\"jets\""),
            qm::order_by("id desc"),
            qm::order_by("name"),
        ]);
        assert_eq!(
            query.build().0,
            "SELECT * FROM \"jets\" ORDER BY id desc, name;"
        );
    }

    #[test]
    fn test_update_keeps_wheres() {
        let mut query = Query::new([
            qm::from("\"airports\""),
            qm::where_("size > ?", [10]),
            qm::or("id = ?", [1]),
            qm::limit(3),
        ]);
        query.set_update(vec![("size".to_string(), Value::Int64(20))]);

        let (sql, args) = query.build();
        assert_eq!(
            sql,
            "UPDATE \"airports\" SET \"size\"=$1 WHERE (size > $2) OR (id = $3);"
        );
        assert_eq!(args, vec![Value::Int64(20), Value::Int64(10), Value::Int64(1)]);
    }

    #[test]
    fn test_delete() {
        let mut query = Query::new([qm::from("\"jets\""), qm::where_("name = ?", ["a"])]);
        query.set_delete();
        assert_eq!(query.build().0, "DELETE FROM \"jets\" WHERE (name = $1);");

        let mut all = Query::new([qm::from("\"jets\"")]);
        all.set_delete();
        assert_eq!(all.build().0, "DELETE FROM \"jets\";");
    }

    #[test]
    fn test_rebind() {
        assert_eq!(
            rebind("select * from jets where id > ? and name <> ?"),
            "select * from jets where id > $1 and name <> $2"
        );
        assert_eq!(rebind("select 1"), "select 1");
    }
}
