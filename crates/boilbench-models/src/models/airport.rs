//! The `airports` table and its `jets` relationship.

use std::sync::LazyLock;

use boilbench_mimic::{Executor, FromRow, Row, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::Columns;
use crate::error::Result;
use crate::model::{bind_row, decode_field, quote, unknown_field, Model, ModelQuery, StatementCache};
use crate::models::jet::{jet_columns, Jet};
use crate::query::{qm, Query, QueryMod};

pub mod airport_columns {
    pub const ID: &str = "id";
    pub const SIZE: &str = "size";
}

static AIRPORT_INSERT_CACHE: LazyLock<StatementCache> = LazyLock::new(StatementCache::new);
static AIRPORT_UPDATE_CACHE: LazyLock<StatementCache> = LazyLock::new(StatementCache::new);
static AIRPORT_UPSERT_CACHE: LazyLock<StatementCache> = LazyLock::new(StatementCache::new);

/// Loaded relationships of an [`Airport`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirportR {
    pub jets: Vec<Jet>,
}

/// A row of the `airports` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip)]
    pub r: AirportR,
}

impl Airport {
    /// Query for the jets stationed at this airport.
    pub fn jets(&self, mods: impl IntoIterator<Item = QueryMod>) -> ModelQuery<Jet> {
        let mut query = Query::new(mods);
        query.apply([qm::where_("\"jets\".\"airport_id\"=?", [self.id])]);
        query.set_from(quote(Jet::TABLE));
        if query.selected().is_empty() {
            query.set_select(vec!["\"jets\".*".to_string()]);
        }
        ModelQuery::new(query)
    }

    /// Attach jets to this airport.
    ///
    /// With `insert` the jets are inserted as new rows, otherwise their
    /// `airport_id` is updated in place. Either way they are appended to
    /// the loaded relationship.
    pub fn add_jets<E: Executor>(
        &mut self,
        exec: &E,
        insert: bool,
        mut related: Vec<Jet>,
    ) -> Result<()> {
        for jet in &mut related {
            jet.airport_id = self.id;
            if insert {
                jet.insert(exec, Columns::Infer)?;
            } else {
                let query = format!(
                    "UPDATE {} SET \"{}\"=$1 WHERE \"{}\"=$2",
                    quote(Jet::TABLE),
                    jet_columns::AIRPORT_ID,
                    jet_columns::ID
                );
                exec.exec(&query, &[self.id.into(), jet.id.into()])?;
            }
        }
        self.r.jets.extend(related);
        Ok(())
    }
}

/// Eager-load the jets of every airport in `airports` with one query.
///
/// Jets are matched to airports by `airport_id`; airports with no jets end
/// up with an empty relationship.
pub fn load_jets<E: Executor>(
    exec: &E,
    airports: &mut [Airport],
    mods: impl IntoIterator<Item = QueryMod>,
) -> Result<()> {
    let mut ids: Vec<i64> = Vec::with_capacity(airports.len());
    for airport in airports.iter_mut() {
        airport.r.jets.clear();
        if !ids.contains(&airport.id) {
            ids.push(airport.id);
        }
    }
    if ids.is_empty() {
        return Ok(());
    }

    let mut query = Query::new([
        qm::from(Jet::TABLE),
        qm::where_in("jets.airport_id in ?", ids),
    ]);
    query.apply(mods);
    let jets: Vec<Jet> = query.bind_all(exec)?;
    debug!(airports = airports.len(), jets = jets.len(), "eager loaded jets");

    for jet in jets {
        if let Some(airport) = airports.iter_mut().find(|a| a.id == jet.airport_id) {
            airport.r.jets.push(jet);
        }
    }
    Ok(())
}

impl FromRow for Airport {
    fn from_row(row: &Row<'_>) -> boilbench_mimic::Result<Self> {
        bind_row(row)
    }
}

impl Model for Airport {
    const TABLE: &'static str = "airports";
    const ALL_COLUMNS: &'static [&'static str] = &[airport_columns::ID, airport_columns::SIZE];
    const COLUMNS_WITH_DEFAULT: &'static [&'static str] = &[airport_columns::ID];
    const PRIMARY_KEY: &'static [&'static str] = &[airport_columns::ID];

    fn value(&self, column: &str) -> Option<Value> {
        match column {
            airport_columns::ID => Some(self.id.into()),
            airport_columns::SIZE => Some(self.size.into()),
            _ => None,
        }
    }

    fn set(&mut self, column: &str, value: &Value) -> boilbench_mimic::Result<()> {
        match column {
            airport_columns::ID => self.id = decode_field(column, value)?,
            airport_columns::SIZE => self.size = decode_field(column, value)?,
            _ => return Err(unknown_field(Self::TABLE, column)),
        }
        Ok(())
    }

    fn insert_cache() -> &'static StatementCache {
        &AIRPORT_INSERT_CACHE
    }

    fn update_cache() -> &'static StatementCache {
        &AIRPORT_UPDATE_CACHE
    }

    fn upsert_cache() -> &'static StatementCache {
        &AIRPORT_UPSERT_CACHE
    }
}

/// Query the `airports` table.
pub fn airports(mods: impl IntoIterator<Item = QueryMod>) -> ModelQuery<Airport> {
    Airport::query(mods)
}

pub fn find_airport<E: Executor>(exec: &E, id: i64, select: &[&str]) -> Result<Airport> {
    Airport::find(exec, vec![id.into()], select)
}

pub fn airport_exists<E: Executor>(exec: &E, id: i64) -> Result<bool> {
    Airport::exists(exec, vec![id.into()])
}
