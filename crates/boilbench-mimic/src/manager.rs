//! Driver lookup by name.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::config::MimicConfig;
use crate::database::Database;
use crate::driver::{Driver, MimicDriver};
use crate::error::{Error, Result};

/// Set of drivers addressable by name.
///
/// Each test or benchmark owns its manager, so registrations never leak
/// between them.
#[derive(Default)]
pub struct DriverManager {
    drivers: DashMap<String, Arc<dyn Driver>>,
}

impl DriverManager {
    /// Create a manager with no drivers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with a mimic driver registered from `config`.
    pub fn with_mimic(config: MimicConfig) -> Self {
        let manager = Self::new();
        manager
            .drivers
            .insert(config.driver_name.clone(), MimicDriver::shared(config));
        manager
    }

    /// Register a driver under its own name.
    pub fn register(&self, driver: Arc<dyn Driver>) -> Result<()> {
        let name = driver.name().to_string();
        match self.drivers.entry(name) {
            Entry::Occupied(entry) => Err(Error::DriverExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(driver = %entry.key(), "driver registered");
                entry.insert(driver);
                Ok(())
            }
        }
    }

    /// Remove a driver.
    pub fn deregister(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.remove(name).map(|(_, driver)| driver)
    }

    /// Look up a driver by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Driver>> {
        self.drivers
            .get(name)
            .map(|driver| Arc::clone(driver.value()))
            .ok_or_else(|| Error::UnknownDriver(name.to_string()))
    }

    /// Registered driver names, sorted.
    pub fn drivers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.drivers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Open a database through the driver called `name`.
    pub fn open(&self, name: &str, dsn: &str) -> Result<Database> {
        let driver = self.get(name)?;
        let conn = driver.open(dsn)?;
        Ok(Database::new(name, conn))
    }
}

impl std::fmt::Debug for DriverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverManager")
            .field("drivers", &self.drivers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectation::ExecResult;
    use crate::registry::ExpectationRegistry;

    #[test]
    fn test_register_and_open() {
        let registry = ExpectationRegistry::shared();
        registry.new_result(ExecResult::new(1));
        let manager = DriverManager::with_mimic(MimicConfig::new(registry));

        assert_eq!(manager.drivers(), vec!["mimic".to_string()]);
        let db = manager.open("mimic", "").unwrap();
        assert_eq!(db.driver_name(), "mimic");
    }

    #[test]
    fn test_with_mimic_uses_configured_name() {
        let manager = DriverManager::with_mimic(MimicConfig::default().with_driver_name("mimic-pop"));
        assert_eq!(manager.drivers(), vec!["mimic-pop".to_string()]);
        assert_eq!(manager.get("mimic-pop").unwrap().name(), "mimic-pop");
        assert!(manager.get("mimic").is_err());
    }

    #[test]
    fn test_duplicate_driver() {
        let manager = DriverManager::with_mimic(MimicConfig::default());
        let err = manager
            .register(MimicDriver::shared(MimicConfig::default()))
            .unwrap_err();
        assert!(matches!(err, Error::DriverExists(name) if name == "mimic"));
    }

    #[test]
    fn test_unknown_driver() {
        let manager = DriverManager::new();
        assert!(matches!(
            manager.open("postgres", ""),
            Err(Error::UnknownDriver(name)) if name == "postgres"
        ));
    }

    #[test]
    fn test_deregister() {
        let manager = DriverManager::with_mimic(MimicConfig::default());
        assert!(manager.deregister("mimic").is_some());
        assert!(manager.get("mimic").is_err());
        assert!(manager.drivers().is_empty());
    }
}
