//! Database handle over a driver connection.

use tracing::trace;

use crate::driver::{Connection, Statement, Transaction};
use crate::error::{Error, Result};
use crate::expectation::ExecResult;
use crate::rows::{FromRow, Rows};
use crate::value::Value;

/// Something statements can run against: a [`Database`] or a [`Tx`].
pub trait Executor {
    /// Run `sql` and return its rows.
    fn query(&self, sql: &str, args: &[Value]) -> Result<Rows>;

    /// Run `sql` for its side effects.
    fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult>;

    /// Run `sql` and decode the first row.
    fn query_one<T: FromRow>(&self, sql: &str, args: &[Value]) -> Result<T> {
        self.query(sql, args)?.one()
    }

    /// Run `sql` and decode every row.
    fn query_all<T: FromRow>(&self, sql: &str, args: &[Value]) -> Result<Vec<T>> {
        self.query(sql, args)?.collect()
    }
}

fn check_args(stmt: &dyn Statement, args: &[Value]) -> Result<()> {
    match stmt.num_input() {
        Some(expected) if expected != args.len() => Err(Error::ArgumentCount {
            expected,
            actual: args.len(),
        }),
        _ => Ok(()),
    }
}

/// A prepared statement that validates its argument count.
pub struct PreparedStatement<'db> {
    stmt: Box<dyn Statement + 'db>,
}

impl PreparedStatement<'_> {
    pub fn num_input(&self) -> Option<usize> {
        self.stmt.num_input()
    }

    pub fn query(&self, args: &[Value]) -> Result<Rows> {
        check_args(self.stmt.as_ref(), args)?;
        self.stmt.query(args)
    }

    pub fn exec(&self, args: &[Value]) -> Result<ExecResult> {
        check_args(self.stmt.as_ref(), args)?;
        self.stmt.exec(args)
    }
}

/// A handle to one open driver connection.
pub struct Database {
    driver_name: String,
    conn: Box<dyn Connection>,
}

impl Database {
    /// Wrap an open connection.
    pub fn new(driver_name: impl Into<String>, conn: Box<dyn Connection>) -> Self {
        Self {
            driver_name: driver_name.into(),
            conn,
        }
    }

    /// Name of the driver this database was opened with.
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// Prepare a statement for repeated use.
    pub fn prepare(&self, sql: &str) -> Result<PreparedStatement<'_>> {
        let stmt = self.conn.prepare(sql)?;
        Ok(PreparedStatement { stmt })
    }

    /// Begin a transaction.
    pub fn begin(&self) -> Result<Tx<'_>> {
        let inner = self.conn.begin()?;
        Ok(Tx {
            db: self,
            inner,
            done: false,
        })
    }

    /// Close the underlying connection.
    pub fn close(mut self) -> Result<()> {
        self.conn.close()
    }
}

impl Executor for Database {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Rows> {
        trace!(sql, "query");
        self.prepare(sql)?.query(args)
    }

    fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        trace!(sql, "exec");
        self.prepare(sql)?.exec(args)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("driver_name", &self.driver_name)
            .finish_non_exhaustive()
    }
}

/// A transaction on a [`Database`].
///
/// Rolled back on drop unless committed.
pub struct Tx<'db> {
    db: &'db Database,
    inner: Box<dyn Transaction>,
    done: bool,
}

impl Tx<'_> {
    pub fn commit(mut self) -> Result<()> {
        self.done = true;
        self.inner.commit()
    }

    pub fn rollback(mut self) -> Result<()> {
        self.done = true;
        self.inner.rollback()
    }
}

impl Executor for Tx<'_> {
    fn query(&self, sql: &str, args: &[Value]) -> Result<Rows> {
        self.db.query(sql, args)
    }

    fn exec(&self, sql: &str, args: &[Value]) -> Result<ExecResult> {
        self.db.exec(sql, args)
    }
}

impl Drop for Tx<'_> {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.inner.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::MimicConfig;
    use crate::driver::MimicDriver;
    use crate::expectation::QueryResult;
    use crate::registry::ExpectationRegistry;

    fn open(registry: &Arc<ExpectationRegistry>) -> Database {
        let driver = MimicDriver::new(MimicConfig::new(Arc::clone(registry)));
        Database::new("mimic", Box::new(driver.connect("").unwrap()))
    }

    #[test]
    fn test_num_input_validation() {
        let registry = ExpectationRegistry::shared();
        registry.new_query(QueryResult::new(["id"]).with_num_input(2));
        let db = open(&registry);

        assert!(db.query("select", &[1.into(), "thing".into()]).is_ok());
        match db.query("select", &[1.into()]) {
            Err(Error::ArgumentCount { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_unvalidated_input_accepts_anything() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(1));
        let db = open(&registry);

        assert!(db.exec("insert", &[]).is_ok());
        let args: Vec<Value> = (0..9).map(Value::from).collect();
        assert!(db.exec("insert", &args).is_ok());
    }

    #[test]
    fn test_query_one_no_rows() {
        let registry = ExpectationRegistry::shared();
        registry.new_query(QueryResult::new(["id"]));
        let db = open(&registry);

        assert!(matches!(db.query_one::<i64>("select", &[]), Err(Error::NoRows)));
        assert!(db.query_all::<i64>("select", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_prepared_statement_reuse() {
        let registry = ExpectationRegistry::shared();
        registry.new_query(QueryResult::new(["id"]).with_row(vec![Value::Int64(5)]));
        let db = open(&registry);

        let stmt = db.prepare("select id from jets").unwrap();
        for _ in 0..3 {
            assert_eq!(stmt.query(&[]).unwrap().one::<i64>().unwrap(), 5);
        }
    }

    #[test]
    fn test_transaction_delegates() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(3));
        let db = open(&registry);

        let tx = db.begin().unwrap();
        assert_eq!(tx.exec("update", &[]).unwrap().rows_affected, 3);
        tx.commit().unwrap();

        let tx = db.begin().unwrap();
        tx.rollback().unwrap();
    }

    #[test]
    fn test_close() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(1));
        let db = open(&registry);
        db.close().unwrap();
    }
}
