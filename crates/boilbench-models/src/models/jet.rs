//! The `jets` table.

use std::sync::LazyLock;

use boilbench_mimic::{Executor, FromRow, Row, Value};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{bind_row, decode_field, unknown_field, Model, ModelQuery, StatementCache};
use crate::models::airport::Airport;
use crate::query::{qm, QueryMod};

/// Column names of the `jets` table.
pub mod jet_columns {
    pub const ID: &str = "id";
    pub const PILOT_ID: &str = "pilot_id";
    pub const AIRPORT_ID: &str = "airport_id";
    pub const NAME: &str = "name";
    pub const COLOR: &str = "color";
    pub const UUID: &str = "uuid";
    pub const IDENTIFIER: &str = "identifier";
    pub const CARGO: &str = "cargo";
    pub const MANIFEST: &str = "manifest";
}

static JET_INSERT_CACHE: LazyLock<StatementCache> = LazyLock::new(StatementCache::new);
static JET_UPDATE_CACHE: LazyLock<StatementCache> = LazyLock::new(StatementCache::new);
static JET_UPSERT_CACHE: LazyLock<StatementCache> = LazyLock::new(StatementCache::new);

/// A row of the `jets` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    pub id: i64,
    pub pilot_id: i64,
    pub airport_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub uuid: String,
    pub identifier: String,
    pub cargo: Vec<u8>,
    pub manifest: Vec<u8>,
}

impl Jet {
    /// Query for the airport this jet belongs to.
    pub fn airport(&self, mods: impl IntoIterator<Item = QueryMod>) -> ModelQuery<Airport> {
        let mut query = Airport::query(mods);
        query
            .query_mut()
            .apply([qm::where_("\"airports\".\"id\"=?", [self.airport_id])]);
        query
    }
}

impl FromRow for Jet {
    fn from_row(row: &Row<'_>) -> boilbench_mimic::Result<Self> {
        bind_row(row)
    }
}

impl Model for Jet {
    const TABLE: &'static str = "jets";
    const ALL_COLUMNS: &'static [&'static str] = &[
        jet_columns::ID,
        jet_columns::PILOT_ID,
        jet_columns::AIRPORT_ID,
        jet_columns::NAME,
        jet_columns::COLOR,
        jet_columns::UUID,
        jet_columns::IDENTIFIER,
        jet_columns::CARGO,
        jet_columns::MANIFEST,
    ];
    const COLUMNS_WITH_DEFAULT: &'static [&'static str] = &[jet_columns::ID];
    const PRIMARY_KEY: &'static [&'static str] = &[jet_columns::ID];

    fn value(&self, column: &str) -> Option<Value> {
        let value = match column {
            jet_columns::ID => self.id.into(),
            jet_columns::PILOT_ID => self.pilot_id.into(),
            jet_columns::AIRPORT_ID => self.airport_id.into(),
            jet_columns::NAME => self.name.as_str().into(),
            jet_columns::COLOR => self.color.as_deref().into(),
            jet_columns::UUID => self.uuid.as_str().into(),
            jet_columns::IDENTIFIER => self.identifier.as_str().into(),
            jet_columns::CARGO => self.cargo.as_slice().into(),
            jet_columns::MANIFEST => self.manifest.as_slice().into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: &Value) -> boilbench_mimic::Result<()> {
        match column {
            jet_columns::ID => self.id = decode_field(column, value)?,
            jet_columns::PILOT_ID => self.pilot_id = decode_field(column, value)?,
            jet_columns::AIRPORT_ID => self.airport_id = decode_field(column, value)?,
            jet_columns::NAME => self.name = decode_field(column, value)?,
            jet_columns::COLOR => self.color = decode_field(column, value)?,
            jet_columns::UUID => self.uuid = decode_field(column, value)?,
            jet_columns::IDENTIFIER => self.identifier = decode_field(column, value)?,
            jet_columns::CARGO => self.cargo = decode_field(column, value)?,
            jet_columns::MANIFEST => self.manifest = decode_field(column, value)?,
            _ => return Err(unknown_field(Self::TABLE, column)),
        }
        Ok(())
    }

    fn insert_cache() -> &'static StatementCache {
        &JET_INSERT_CACHE
    }

    fn update_cache() -> &'static StatementCache {
        &JET_UPDATE_CACHE
    }

    fn upsert_cache() -> &'static StatementCache {
        &JET_UPSERT_CACHE
    }
}

/// Query the `jets` table.
pub fn jets(mods: impl IntoIterator<Item = QueryMod>) -> ModelQuery<Jet> {
    Jet::query(mods)
}

/// Find a jet by id. Empty `select` reads every column.
pub fn find_jet<E: Executor>(exec: &E, id: i64, select: &[&str]) -> Result<Jet> {
    Jet::find(exec, vec![id.into()], select)
}

pub fn jet_exists<E: Executor>(exec: &E, id: i64) -> Result<bool> {
    Jet::exists(exec, vec![id.into()])
}
