//! Boilbench models - a small query builder and table models over `Executor`.
//!
//! Queries are composed from [`QueryMod`]s and rendered with `$n`
//! placeholders. Table models implement [`Model`], which provides insert
//! with column inference, upsert, update, delete, reload and typed queries.
//! [`ModelSlice`] runs the bulk variants over loaded models.
//!
//! ```
//! use boilbench_models::{jets, qm};
//!
//! let query = jets([qm::where_("id > ?", [1]), qm::limit(1)]);
//! let (sql, _) = query.query().build();
//! assert_eq!(sql, "SELECT * FROM \"jets\" WHERE (id > $1) LIMIT 1;");
//! ```

pub mod columns;
pub mod error;
pub mod model;
pub mod models;
pub mod query;

pub use columns::Columns;
pub use error::{Error, Result};
pub use model::{bind_row, CachedStatement, Model, ModelQuery, ModelSlice, StatementCache};
pub use models::{
    airport_exists, airports, find_airport, find_jet, jet_exists, jets, load_jets, Airport,
    AirportR, Jet,
};
pub use query::{qm, rebind, Conjunction, Query, QueryMod};
