//! Mimic connections, statements and transactions.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::driver::{Connection, Statement, Transaction};
use crate::error::{Error, Result};
use crate::expectation::{ExecResult, Expectation};
use crate::registry::{ExpectationKey, ExpectationRegistry};
use crate::rows::Rows;
use crate::value::Value;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection usable.
    Open,
    /// Connection closed.
    Closed,
}

/// A connection bound to one expectation key.
#[derive(Debug)]
pub struct MimicConnection {
    registry: Arc<ExpectationRegistry>,
    key: ExpectationKey,
    state: ConnectionState,
}

impl MimicConnection {
    pub(crate) fn new(registry: Arc<ExpectationRegistry>, key: ExpectationKey) -> Self {
        Self {
            registry,
            key,
            state: ConnectionState::Open,
        }
    }

    /// Key the connection reads its expectation from.
    pub fn key(&self) -> &ExpectationKey {
        &self.key
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Prepare a statement without boxing it.
    pub fn prepare_statement(&self, query: &str) -> Result<MimicStatement<'_>> {
        if self.state == ConnectionState::Closed {
            return Err(Error::Closed);
        }
        trace!(query, "mimic prepare");
        Ok(MimicStatement {
            conn: self,
            query: query.to_string(),
        })
    }

    fn expectation(&self) -> Result<Arc<Expectation>> {
        if self.state == ConnectionState::Closed {
            return Err(Error::Closed);
        }
        self.registry.get(&self.key).ok_or_else(|| Error::NoExpectation {
            dsn: self.key.dsn().to_string(),
        })
    }
}

impl Connection for MimicConnection {
    fn prepare<'c>(&'c self, query: &str) -> Result<Box<dyn Statement + 'c>> {
        Ok(Box::new(self.prepare_statement(query)?))
    }

    fn begin(&self) -> Result<Box<dyn Transaction>> {
        if self.state == ConnectionState::Closed {
            return Err(Error::Closed);
        }
        trace!("mimic begin");
        Ok(Box::new(MimicTransaction { done: false }))
    }

    fn close(&mut self) -> Result<()> {
        if self.state == ConnectionState::Open {
            debug!(key = self.key.dsn(), "mimic connection closed");
        }
        self.state = ConnectionState::Closed;
        Ok(())
    }
}

/// A statement answering with the connection's expectation.
///
/// The query text is kept for tracing only; it is never parsed.
#[derive(Debug)]
pub struct MimicStatement<'c> {
    conn: &'c MimicConnection,
    query: String,
}

impl Statement for MimicStatement<'_> {
    fn num_input(&self) -> Option<usize> {
        self.conn
            .expectation()
            .ok()
            .and_then(|expectation| expectation.num_input())
    }

    fn query(&self, args: &[Value]) -> Result<Rows> {
        let expectation = self.conn.expectation()?;
        let result = expectation.as_query()?;
        trace!(query = %self.query, args = args.len(), rows = result.len(), "mimic query");
        Ok(Rows::from_result(result))
    }

    fn exec(&self, args: &[Value]) -> Result<ExecResult> {
        let expectation = self.conn.expectation()?;
        let result = *expectation.as_exec()?;
        trace!(
            query = %self.query,
            args = args.len(),
            rows_affected = result.rows_affected,
            "mimic exec"
        );
        Ok(result)
    }
}

/// Transaction with no effect beyond tracking whether it finished.
#[derive(Debug)]
pub struct MimicTransaction {
    done: bool,
}

impl MimicTransaction {
    fn finish(&mut self) -> Result<()> {
        if self.done {
            return Err(Error::TransactionDone);
        }
        self.done = true;
        Ok(())
    }
}

impl Transaction for MimicTransaction {
    fn commit(&mut self) -> Result<()> {
        self.finish()
    }

    fn rollback(&mut self) -> Result<()> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectation::QueryResult;

    fn connection(registry: &Arc<ExpectationRegistry>) -> MimicConnection {
        MimicConnection::new(Arc::clone(registry), ExpectationKey::Default)
    }

    #[test]
    fn test_any_query_returns_expectation() {
        let registry = ExpectationRegistry::shared();
        registry.new_query(QueryResult::new(["id"]).with_row(vec![Value::Int64(1)]));
        let conn = connection(&registry);

        for sql in ["select * from jets", "select 1", "not even sql"] {
            let stmt = conn.prepare(sql).unwrap();
            let rows = stmt.query(&[]).unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows.columns(), &["id".to_string()]);
        }
    }

    #[test]
    fn test_exec_returns_configured_result() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(42).with_last_insert_id(7));
        let conn = connection(&registry);

        let result = conn.prepare("update jets").unwrap().exec(&[]).unwrap();
        assert_eq!(result.rows_affected(), 42);
        assert_eq!(result.last_insert_id().unwrap(), 7);
    }

    #[test]
    fn test_kind_mismatch() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(1));
        let conn = connection(&registry);

        let stmt = conn.prepare("select 1").unwrap();
        assert!(matches!(
            stmt.query(&[]),
            Err(Error::ExpectationMismatch { expected: "query", found: "exec" })
        ));
    }

    #[test]
    fn test_reregistration_visible_to_open_connection() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(1));
        let conn = connection(&registry);

        registry.new_result(ExecResult::new(2));
        let stmt = conn.prepare("delete from jets").unwrap();
        assert_eq!(stmt.exec(&[]).unwrap().rows_affected, 2);

        registry.clear();
        assert!(matches!(stmt.exec(&[]), Err(Error::NoExpectation { .. })));
        assert_eq!(stmt.num_input(), None);
    }

    #[test]
    fn test_num_input_from_expectation() {
        let registry = ExpectationRegistry::shared();
        registry.new_query(QueryResult::new(["id"]).with_num_input(2));
        let conn = connection(&registry);

        assert_eq!(conn.prepare("x").unwrap().num_input(), Some(2));
    }

    #[test]
    fn test_closed_connection() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(1));
        let mut conn = connection(&registry);

        conn.close().unwrap();
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(matches!(conn.prepare("x"), Err(Error::Closed)));
        assert!(matches!(conn.begin(), Err(Error::Closed)));
    }

    #[test]
    fn test_transaction_finishes_once() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(1));
        let conn = connection(&registry);

        let mut tx = conn.begin().unwrap();
        tx.commit().unwrap();
        assert!(matches!(tx.rollback(), Err(Error::TransactionDone)));
    }
}
