//! Model backend.
//!
//! Rows are bound to [`Jet`] by column name and inserts go through column
//! inference with a cached statement.

use boilbench_mimic::Database;
use boilbench_models::{jets, qm, Columns, Jet, Model, Result};

use crate::fixtures::JET_SUBSET_COLUMNS;
use crate::harness::MimicContext;

/// Backend using the table models.
pub struct ModelBackend {
    db: Database,
}

impl ModelBackend {
    pub fn new(ctx: &MimicContext) -> boilbench_mimic::Result<Self> {
        Self::with_dsn(ctx, "")
    }

    pub fn with_dsn(ctx: &MimicContext, dsn: &str) -> boilbench_mimic::Result<Self> {
        Ok(Self { db: ctx.open(dsn)? })
    }

    pub fn select_all(&self) -> Result<Vec<Jet>> {
        jets([]).all(&self.db)
    }

    pub fn select_subset(&self) -> Result<Vec<Jet>> {
        jets([qm::select([JET_SUBSET_COLUMNS.join(", ")])]).all(&self.db)
    }

    pub fn select_complex(&self, id_gt: i64, name_ne: &str) -> Result<Vec<Jet>> {
        jets([
            qm::select([JET_SUBSET_COLUMNS.join(", ")]),
            qm::where_("id > ?", [id_gt]),
            qm::and("name <> ?", [name_ne]),
            qm::limit(1),
            qm::group_by("id"),
            qm::offset(1),
        ])
        .all(&self.db)
    }

    /// Insert with inferred columns. Zero-valued defaults are read back
    /// into `jet`.
    pub fn insert(&self, jet: &mut Jet) -> Result<()> {
        jet.insert(&self.db, Columns::Infer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{
        jet_exec, jet_insert_returning, jet_query, jet_query_subset, sample_jet, Scale,
        INSERT_DSN,
    };

    #[test]
    fn test_model_select_all() {
        let ctx = MimicContext::with_query(jet_query(Scale::Large));
        let backend = ModelBackend::new(&ctx).unwrap();

        let all = backend.select_all().unwrap();
        assert_eq!(all.len(), 1_000);
        assert_eq!(all[0], sample_jet());
    }

    #[test]
    fn test_model_subset_leaves_zero_values() {
        let ctx = MimicContext::with_query(jet_query_subset(Scale::Small));
        let backend = ModelBackend::new(&ctx).unwrap();

        let subset = backend.select_subset().unwrap();
        assert_eq!(subset.len(), 10);
        assert!(subset.iter().all(|j| j.pilot_id == 0 && j.airport_id == 0));

        let complex = backend.select_complex(1, "thing").unwrap();
        assert_eq!(complex[0].name, "test");
    }

    #[test]
    fn test_model_insert_exec() {
        let ctx = MimicContext::new();
        ctx.register_result_dsn(INSERT_DSN, jet_exec());
        let backend = ModelBackend::with_dsn(&ctx, INSERT_DSN).unwrap();

        let mut jet = sample_jet();
        backend.insert(&mut jet).unwrap();
        assert_eq!(jet.id, 1);
    }

    #[test]
    fn test_model_insert_returning() {
        let ctx = MimicContext::with_query(jet_insert_returning());
        let backend = ModelBackend::new(&ctx).unwrap();

        let mut jet = Jet {
            id: 0,
            ..sample_jet()
        };
        backend.insert(&mut jet).unwrap();
        assert_eq!(jet.id, 1);
        assert!(!Jet::insert_cache().is_empty());
    }
}
