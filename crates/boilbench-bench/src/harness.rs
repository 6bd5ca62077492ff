//! Benchmark harness helpers.
//!
//! A [`MimicContext`] owns the expectation registry and a driver manager
//! with the mimic driver registered, so each benchmark group runs against
//! its own canned results.

use std::sync::Arc;

use boilbench_mimic::{
    Database, DriverManager, ExecResult, ExpectationRegistry, MimicConfig, QueryResult, Result,
};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

/// Expectations and driver for one benchmark group.
pub struct MimicContext {
    pub registry: Arc<ExpectationRegistry>,
    pub manager: DriverManager,
    driver_name: String,
}

impl MimicContext {
    /// Create a context with an empty registry.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Create a context whose driver config is adjusted by `f`.
    pub fn with_config(f: impl FnOnce(MimicConfig) -> MimicConfig) -> Self {
        let registry = ExpectationRegistry::shared();
        let config = f(MimicConfig::new(Arc::clone(&registry)));
        let driver_name = config.driver_name.clone();
        Self {
            registry,
            manager: DriverManager::with_mimic(config),
            driver_name,
        }
    }

    /// Create a context answering every statement with `query`.
    pub fn with_query(query: QueryResult) -> Self {
        let ctx = Self::new();
        ctx.registry.new_query(query);
        ctx
    }

    /// Create a context answering every statement with `result`.
    pub fn with_result(result: ExecResult) -> Self {
        let ctx = Self::new();
        ctx.registry.new_result(result);
        ctx
    }

    /// Replace the default expectation with a row-set.
    pub fn register_query(&self, query: QueryResult) {
        self.registry.new_query(query);
    }

    /// Replace the default expectation with an exec result.
    pub fn register_result(&self, result: ExecResult) {
        self.registry.new_result(result);
    }

    pub fn register_query_dsn(&self, dsn: &str, query: QueryResult) {
        self.registry.new_query_dsn(dsn, query);
    }

    pub fn register_result_dsn(&self, dsn: &str, result: ExecResult) {
        self.registry.new_result_dsn(dsn, result);
    }

    /// Name of the driver this context opens databases with.
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// Open a database on the mimic driver.
    pub fn open(&self, dsn: &str) -> Result<Database> {
        debug!(driver = %self.driver_name, dsn, "opening benchmark database");
        self.manager.open(&self.driver_name, dsn)
    }

    /// Open a database on the default expectation.
    pub fn open_default(&self) -> Result<Database> {
        self.open("")
    }
}

impl Default for MimicContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MimicContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MimicContext")
            .field("driver_name", &self.driver_name)
            .field("expectations", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{jet_exec, jet_query, Scale, INSERT_DSN};
    use boilbench_mimic::Executor;

    #[test]
    fn test_context_open_default() {
        let ctx = MimicContext::with_query(jet_query(Scale::Small));
        let db = ctx.open_default().unwrap();
        assert_eq!(db.query("select * from jets", &[]).unwrap().len(), 10);
        assert_eq!(ctx.driver_name(), boilbench_mimic::DEFAULT_DRIVER_NAME);
    }

    #[test]
    fn test_context_empty_registry_fails() {
        let ctx = MimicContext::new();
        assert!(ctx.open_default().is_err());
    }

    #[test]
    fn test_context_dsn_result() {
        let ctx = MimicContext::with_config(|c| c.with_default_fallback(false));
        ctx.register_result_dsn(INSERT_DSN, jet_exec());

        let db = ctx.open(INSERT_DSN).unwrap();
        assert_eq!(db.exec("insert", &[]).unwrap().rows_affected(), 1);
        assert!(ctx.open("").is_err());
    }

    #[test]
    fn test_context_custom_driver_name() {
        let ctx = MimicContext::with_config(|c| c.with_driver_name("mimic-pop"));
        ctx.register_result(jet_exec());
        assert_eq!(ctx.open_default().unwrap().driver_name(), "mimic-pop");
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
