//! Driver configuration.

use std::sync::Arc;

use crate::registry::ExpectationRegistry;

/// Default name the mimic driver registers under.
pub const DEFAULT_DRIVER_NAME: &str = "mimic";

/// Mimic driver configuration.
#[derive(Debug, Clone)]
pub struct MimicConfig {
    /// Name used with [`DriverManager::open`](crate::DriverManager::open).
    pub driver_name: String,

    /// Registry the driver reads expectations from.
    pub registry: Arc<ExpectationRegistry>,

    /// Whether a DSN without its own entry falls back to the default key.
    pub default_fallback: bool,
}

impl MimicConfig {
    /// Create a configuration reading from `registry`.
    pub fn new(registry: Arc<ExpectationRegistry>) -> Self {
        Self {
            driver_name: DEFAULT_DRIVER_NAME.to_string(),
            registry,
            default_fallback: true,
        }
    }

    /// Set the driver name.
    pub fn with_driver_name(mut self, name: impl Into<String>) -> Self {
        self.driver_name = name.into();
        self
    }

    /// Enable or disable falling back to the default expectation.
    pub fn with_default_fallback(mut self, fallback: bool) -> Self {
        self.default_fallback = fallback;
        self
    }
}

impl Default for MimicConfig {
    fn default() -> Self {
        Self::new(ExpectationRegistry::shared())
    }
}
