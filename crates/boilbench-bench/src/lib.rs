//! Boilbench benchmark suite
//!
//! Measures the overhead of data-access styles over the mimic driver using
//! Criterion. The driver answers every statement with a canned result, so
//! the numbers isolate SQL rendering, argument handling and row binding.
//!
//! # Benchmark Categories
//!
//! - **Select**: all columns, a column subset and a filtered query across
//!   row-set scales
//! - **Insert**: exec inserts, `RETURNING` inserts and DSN-keyed inserts
//! - **Driver**: raw open/prepare/query/exec cost as a baseline

pub mod backends;
pub mod fixtures;
pub mod harness;

pub use backends::{BuilderBackend, ModelBackend, RawBackend};
pub use fixtures::{
    airport_query, jet_exec, jet_insert_returning, jet_query, jet_query_subset, Scale,
};
pub use harness::{init_tracing, MimicContext};
