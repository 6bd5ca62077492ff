//! Query-builder backend.
//!
//! SQL is rendered from query modifiers on every call; rows are scanned by
//! position like the raw backend.

use boilbench_mimic::{Database, Executor, Result, Value};
use boilbench_models::{qm, rebind, Query};

use super::rows::{JetRow, JetSubsetRow};
use crate::fixtures::{JET_COLUMNS, JET_SUBSET_COLUMNS};
use crate::harness::MimicContext;

/// Backend composing queries with [`Query`].
pub struct BuilderBackend {
    db: Database,
}

impl BuilderBackend {
    pub fn new(ctx: &MimicContext) -> Result<Self> {
        Self::with_dsn(ctx, "")
    }

    pub fn with_dsn(ctx: &MimicContext, dsn: &str) -> Result<Self> {
        Ok(Self { db: ctx.open(dsn)? })
    }

    fn run<T: boilbench_mimic::FromRow>(&self, query: Query) -> Result<Vec<T>> {
        let (sql, args) = query.build();
        self.db.query_all(&sql, &args)
    }

    pub fn select_all(&self) -> Result<Vec<JetRow>> {
        self.run(Query::new([qm::from("jets")]))
    }

    pub fn select_subset(&self) -> Result<Vec<JetSubsetRow>> {
        self.run(Query::new([qm::select(JET_SUBSET_COLUMNS), qm::from("jets")]))
    }

    pub fn select_complex(&self, id_gt: i64, name_ne: &str) -> Result<Vec<JetSubsetRow>> {
        self.run(Query::new([
            qm::select(JET_SUBSET_COLUMNS),
            qm::from("jets"),
            qm::where_("id > ?", [id_gt]),
            qm::and("name <> ?", [name_ne]),
            qm::group_by("id"),
            qm::limit(1),
            qm::offset(1),
        ]))
    }

    /// Insert every column, returning the rows affected.
    pub fn insert(&self, jet: &JetRow) -> Result<u64> {
        let sql = rebind(&insert_sql());
        let args: Vec<Value> = jet.args();
        Ok(self.db.exec(&sql, &args)?.rows_affected())
    }
}

fn insert_sql() -> String {
    let placeholders = vec!["?"; JET_COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO jets ({}) VALUES ({})",
        JET_COLUMNS.join(", "),
        placeholders
    )
}
