//! Hand-written SQL backend.

use boilbench_mimic::{Database, Executor, Result};

use super::rows::{JetRow, JetSubsetRow};
use crate::harness::MimicContext;

const SELECT_ALL: &str = "select * from jets";
const SELECT_SUBSET: &str =
    "select id, name, color, uuid, identifier, cargo, manifest from jets";
const SELECT_COMPLEX: &str = "select id, name, color, uuid, identifier, cargo, manifest \
     from jets where id > $1 and name <> $2 group by id limit 1 offset 1";
const INSERT: &str = "insert into jets (id, pilot_id, airport_id, name, color, uuid, \
     identifier, cargo, manifest) values ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

/// Backend running fixed SQL strings.
pub struct RawBackend {
    db: Database,
}

impl RawBackend {
    /// Open on the context's default expectation.
    pub fn new(ctx: &MimicContext) -> Result<Self> {
        Self::with_dsn(ctx, "")
    }

    pub fn with_dsn(ctx: &MimicContext, dsn: &str) -> Result<Self> {
        Ok(Self { db: ctx.open(dsn)? })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn select_all(&self) -> Result<Vec<JetRow>> {
        self.db.query_all(SELECT_ALL, &[])
    }

    pub fn select_subset(&self) -> Result<Vec<JetSubsetRow>> {
        self.db.query_all(SELECT_SUBSET, &[])
    }

    pub fn select_complex(&self, id_gt: i64, name_ne: &str) -> Result<Vec<JetSubsetRow>> {
        self.db
            .query_all(SELECT_COMPLEX, &[id_gt.into(), name_ne.into()])
    }

    /// Insert every column, returning the rows affected.
    pub fn insert(&self, jet: &JetRow) -> Result<u64> {
        let stmt = self.db.prepare(INSERT)?;
        Ok(stmt.exec(&jet.args())?.rows_affected())
    }
}
