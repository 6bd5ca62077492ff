//! Driver interface and the mimic driver.
//!
//! The traits here are the seam every access layer goes through: a
//! [`Driver`] opens [`Connection`]s, a connection prepares [`Statement`]s and
//! begins [`Transaction`]s. [`MimicDriver`] implements them by answering
//! every statement with the expectation registered for the connection's DSN.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::MimicConfig;
use crate::connection::MimicConnection;
use crate::error::{Error, Result};
use crate::expectation::ExecResult;
use crate::rows::Rows;
use crate::value::Value;

/// A database driver.
pub trait Driver: Send + Sync {
    /// Name the driver is registered under.
    fn name(&self) -> &str;

    /// Open a connection to `dsn`.
    fn open(&self, dsn: &str) -> Result<Box<dyn Connection>>;
}

/// A driver connection.
pub trait Connection: Send {
    /// Prepare a statement.
    fn prepare<'c>(&'c self, query: &str) -> Result<Box<dyn Statement + 'c>>;

    /// Begin a transaction.
    fn begin(&self) -> Result<Box<dyn Transaction>>;

    /// Close the connection. Further calls fail.
    fn close(&mut self) -> Result<()>;
}

/// A prepared statement.
pub trait Statement {
    /// Number of arguments the statement expects. `None` disables checking.
    fn num_input(&self) -> Option<usize>;

    /// Run the statement and return its rows.
    fn query(&self, args: &[Value]) -> Result<Rows>;

    /// Run the statement for its side effects.
    fn exec(&self, args: &[Value]) -> Result<ExecResult>;
}

/// A driver transaction.
pub trait Transaction: Send {
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

/// Driver that answers statements from an expectation registry.
#[derive(Debug, Clone)]
pub struct MimicDriver {
    config: MimicConfig,
}

impl MimicDriver {
    /// Create a driver from a configuration.
    pub fn new(config: MimicConfig) -> Self {
        Self { config }
    }

    /// Create a driver ready to register with a [`DriverManager`](crate::DriverManager).
    pub fn shared(config: MimicConfig) -> Arc<dyn Driver> {
        Arc::new(Self::new(config))
    }

    /// Open a connection without boxing it.
    pub fn connect(&self, dsn: &str) -> Result<MimicConnection> {
        let registry = &self.config.registry;
        let key = registry
            .resolve(dsn, self.config.default_fallback)
            .ok_or_else(|| {
                warn!(dsn, driver = %self.config.driver_name, "no expectation registered");
                Error::NoExpectation {
                    dsn: dsn.to_string(),
                }
            })?;

        debug!(dsn, key = key.dsn(), "mimic connection opened");
        Ok(MimicConnection::new(Arc::clone(registry), key))
    }
}

impl Driver for MimicDriver {
    fn name(&self) -> &str {
        &self.config.driver_name
    }

    fn open(&self, dsn: &str) -> Result<Box<dyn Connection>> {
        Ok(Box::new(self.connect(dsn)?))
    }
}
