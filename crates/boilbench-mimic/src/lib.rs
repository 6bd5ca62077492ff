//! Mimic - a mock SQL driver for measuring data-access overhead.
//!
//! The driver never parses or runs SQL. Every statement on a connection is
//! answered with the expectation registered for that connection's DSN (or
//! the default expectation), so benchmarks measure only the access layer
//! sitting on top of the driver.
//!
//! # Quick Start
//!
//! ```
//! use boilbench_mimic::{
//!     DriverManager, Executor, ExpectationRegistry, MimicConfig, QueryResult, Value,
//! };
//!
//! let registry = ExpectationRegistry::shared();
//! registry.new_query(QueryResult::new(["id", "name"]).with_row(vec![
//!     Value::Int64(1),
//!     Value::from("test"),
//! ]));
//!
//! let manager = DriverManager::with_mimic(MimicConfig::new(registry));
//! let db = manager.open("mimic", "").unwrap();
//!
//! let rows = db.query("select id, name from jets", &[]).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

pub mod config;
pub mod connection;
pub mod database;
pub mod driver;
pub mod error;
pub mod expectation;
pub mod manager;
pub mod registry;
pub mod rows;
pub mod value;

pub use config::{MimicConfig, DEFAULT_DRIVER_NAME};
pub use connection::{ConnectionState, MimicConnection, MimicStatement, MimicTransaction};
pub use database::{Database, Executor, PreparedStatement, Tx};
pub use driver::{Connection, Driver, MimicDriver, Statement, Transaction};
pub use error::{Error, Result};
pub use expectation::{ExecResult, Expectation, QueryResult};
pub use manager::DriverManager;
pub use registry::{ExpectationKey, ExpectationRegistry};
pub use rows::{FromRow, Row, Rows};
pub use value::{FromValue, Value};
