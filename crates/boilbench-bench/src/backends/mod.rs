//! Data-access styles compared by the benchmarks.
//!
//! Each backend runs the same operations against a mimic database:
//! `select_all`, `select_subset`, `select_complex` and `insert`.
//!
//! - [`RawBackend`]: hand-written SQL, rows scanned by position.
//! - [`BuilderBackend`]: SQL rendered by the query builder, rows scanned by
//!   position.
//! - [`ModelBackend`]: generated-style models bound by column name.

pub mod builder;
pub mod model;
pub mod raw;

pub use builder::BuilderBackend;
pub use model::ModelBackend;
pub use raw::RawBackend;

/// Common row types for positional backends.
pub mod rows {
    use boilbench_mimic::{FromRow, Result, Row, Value};

    /// Full jet row.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct JetRow {
        pub id: i64,
        pub pilot_id: i64,
        pub airport_id: i64,
        pub name: String,
        pub color: Option<String>,
        pub uuid: String,
        pub identifier: String,
        pub cargo: Vec<u8>,
        pub manifest: Vec<u8>,
    }

    impl JetRow {
        /// Arguments for an insert of every column, in table order.
        pub fn args(&self) -> Vec<Value> {
            vec![
                self.id.into(),
                self.pilot_id.into(),
                self.airport_id.into(),
                self.name.as_str().into(),
                self.color.as_deref().into(),
                self.uuid.as_str().into(),
                self.identifier.as_str().into(),
                self.cargo.as_slice().into(),
                self.manifest.as_slice().into(),
            ]
        }
    }

    impl FromRow for JetRow {
        fn from_row(row: &Row<'_>) -> Result<Self> {
            Ok(Self {
                id: row.get(0)?,
                pilot_id: row.get(1)?,
                airport_id: row.get(2)?,
                name: row.get(3)?,
                color: row.get(4)?,
                uuid: row.get(5)?,
                identifier: row.get(6)?,
                cargo: row.get(7)?,
                manifest: row.get(8)?,
            })
        }
    }

    /// Jet row with the subset columns.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct JetSubsetRow {
        pub id: i64,
        pub name: String,
        pub color: Option<String>,
        pub uuid: String,
        pub identifier: String,
        pub cargo: Vec<u8>,
        pub manifest: Vec<u8>,
    }

    impl FromRow for JetSubsetRow {
        fn from_row(row: &Row<'_>) -> Result<Self> {
            Ok(Self {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                uuid: row.get(3)?,
                identifier: row.get(4)?,
                cargo: row.get(5)?,
                manifest: row.get(6)?,
            })
        }
    }
}
