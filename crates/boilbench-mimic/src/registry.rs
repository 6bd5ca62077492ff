//! Scoped expectation registry.
//!
//! A registry is created per test or benchmark and shared with the driver
//! through [`MimicConfig`](crate::MimicConfig). Expectations are registered
//! before a benchmark group runs and read on every statement call.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::expectation::{ExecResult, Expectation, QueryResult};

/// Key an expectation is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpectationKey {
    /// Used by connections whose DSN has no entry of its own.
    Default,
    /// Used by connections opened with exactly this DSN.
    Dsn(String),
}

impl ExpectationKey {
    /// Key for a DSN. The empty DSN maps to the default key.
    pub fn for_dsn(dsn: &str) -> Self {
        if dsn.is_empty() {
            ExpectationKey::Default
        } else {
            ExpectationKey::Dsn(dsn.to_string())
        }
    }

    /// The DSN this key stands for (empty for the default key).
    pub fn dsn(&self) -> &str {
        match self {
            ExpectationKey::Default => "",
            ExpectationKey::Dsn(dsn) => dsn,
        }
    }
}

/// Mapping from DSN (or the default key) to expectation.
#[derive(Debug, Default)]
pub struct ExpectationRegistry {
    entries: RwLock<HashMap<ExpectationKey, Arc<Expectation>>>,
}

impl ExpectationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry ready to share with a driver.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register the expectation used by any connection without a DSN entry.
    pub fn register(&self, expectation: impl Into<Expectation>) {
        self.insert(ExpectationKey::Default, expectation.into());
    }

    /// Register the expectation used by connections opened with `dsn`.
    pub fn register_for_dsn(&self, dsn: &str, expectation: impl Into<Expectation>) {
        self.insert(ExpectationKey::for_dsn(dsn), expectation.into());
    }

    /// Register a default row-set.
    pub fn new_query(&self, query: QueryResult) {
        self.register(query);
    }

    /// Register a default exec result.
    pub fn new_result(&self, result: ExecResult) {
        self.register(result);
    }

    /// Register a row-set for `dsn`.
    pub fn new_query_dsn(&self, dsn: &str, query: QueryResult) {
        self.register_for_dsn(dsn, query);
    }

    /// Register an exec result for `dsn`.
    pub fn new_result_dsn(&self, dsn: &str, result: ExecResult) {
        self.register_for_dsn(dsn, result);
    }

    fn insert(&self, key: ExpectationKey, expectation: Expectation) {
        debug!(dsn = key.dsn(), kind = expectation.kind(), "registering expectation");
        self.entries.write().insert(key, Arc::new(expectation));
    }

    /// Look up the expectation stored under `key`.
    pub fn get(&self, key: &ExpectationKey) -> Option<Arc<Expectation>> {
        self.entries.read().get(key).cloned()
    }

    /// Check whether `key` has an expectation.
    pub fn contains(&self, key: &ExpectationKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Resolve the key a connection to `dsn` should use.
    ///
    /// The exact DSN wins; otherwise the default key is used when
    /// `fallback` is set and a default is registered.
    pub fn resolve(&self, dsn: &str, fallback: bool) -> Option<ExpectationKey> {
        let entries = self.entries.read();
        let key = ExpectationKey::for_dsn(dsn);
        if entries.contains_key(&key) {
            return Some(key);
        }
        if fallback && entries.contains_key(&ExpectationKey::Default) {
            return Some(ExpectationKey::Default);
        }
        None
    }

    /// Remove the expectation stored under `key`.
    pub fn remove(&self, key: &ExpectationKey) -> Option<Arc<Expectation>> {
        self.entries.write().remove(key)
    }

    /// Remove every expectation.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_empty_dsn_is_default() {
        assert_eq!(ExpectationKey::for_dsn(""), ExpectationKey::Default);
        assert_eq!(
            ExpectationKey::for_dsn("postgres://a"),
            ExpectationKey::Dsn("postgres://a".into())
        );
        assert_eq!(ExpectationKey::Default.dsn(), "");
    }

    #[test]
    fn test_resolve_prefers_exact_dsn() {
        let registry = ExpectationRegistry::new();
        registry.new_result(ExecResult::new(1));
        registry.new_result_dsn("postgres://a", ExecResult::new(2));

        assert_eq!(
            registry.resolve("postgres://a", true),
            Some(ExpectationKey::Dsn("postgres://a".into()))
        );
        assert_eq!(
            registry.resolve("postgres://b", true),
            Some(ExpectationKey::Default)
        );
        assert_eq!(registry.resolve("postgres://b", false), None);
        assert_eq!(registry.resolve("", false), Some(ExpectationKey::Default));
    }

    #[test]
    fn test_resolve_empty_registry() {
        let registry = ExpectationRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve("", true), None);
        assert_eq!(registry.resolve("postgres://a", true), None);
    }

    #[test]
    fn test_register_replaces() {
        let registry = ExpectationRegistry::new();
        registry.new_query(QueryResult::new(["id"]).with_row(vec![Value::Int64(1)]));
        registry.new_result(ExecResult::new(5));

        assert_eq!(registry.len(), 1);
        let exp = registry.get(&ExpectationKey::Default).unwrap();
        assert_eq!(exp.as_exec().unwrap().rows_affected, 5);
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = ExpectationRegistry::new();
        registry.new_result(ExecResult::new(1));
        registry.new_result_dsn("x", ExecResult::new(1));

        assert!(registry.remove(&ExpectationKey::Dsn("x".into())).is_some());
        assert!(!registry.contains(&ExpectationKey::Dsn("x".into())));
        registry.clear();
        assert!(registry.is_empty());
    }
}
