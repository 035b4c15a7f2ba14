//! Configuration for Cabinet
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::codec::DEFAULT_MAX_NAME_LEN;
use crate::error::{CabinetError, Result};
use crate::validation::ValidationRules;

/// Main configuration for a Cabinet instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Which backend holds the records (chosen once, at open)
    pub storage: StorageKind,

    /// Fixed width of each name field in a file slot (bytes)
    pub max_name_len: usize,

    // -------------------------------------------------------------------------
    // Validation Configuration
    // -------------------------------------------------------------------------
    /// Rule set every record is checked against
    pub rules: ValidationRules,

    // -------------------------------------------------------------------------
    // Query Configuration
    // -------------------------------------------------------------------------
    /// Number of select results kept in the query cache (0 disables it)
    pub query_cache_capacity: usize,
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    /// Volatile, list-backed
    Memory,

    /// Fixed-slot binary file at `path`
    File { path: PathBuf },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageKind::Memory,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            rules: ValidationRules::default(),
            query_cache_capacity: 64,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings no store can work with
    pub fn check(&self) -> Result<()> {
        if self.max_name_len == 0 {
            return Err(CabinetError::Config(
                "max_name_len must be at least 1".to_string(),
            ));
        }
        for (field, rule) in [
            ("first_name", &self.rules.first_name),
            ("last_name", &self.rules.last_name),
        ] {
            if rule.min_len > rule.max_len {
                return Err(CabinetError::Config(format!(
                    "{} rule has min_len {} above max_len {}",
                    field, rule.min_len, rule.max_len
                )));
            }
        }
        if self.rules.height.min > self.rules.height.max {
            return Err(CabinetError::Config(format!(
                "height rule has min {} above max {}",
                self.rules.height.min, self.rules.height.max
            )));
        }
        if self.rules.marital_statuses.is_empty() {
            return Err(CabinetError::Config(
                "at least one marital status must be allowed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Keep records in memory only
    pub fn memory(mut self) -> Self {
        self.config.storage = StorageKind::Memory;
        self
    }

    /// Keep records in the slot file at `path`
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage = StorageKind::File { path: path.into() };
        self
    }

    /// Set the fixed name width of file slots (in bytes)
    pub fn max_name_len(mut self, len: usize) -> Self {
        self.config.max_name_len = len;
        self
    }

    /// Set the validation rule set
    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.config.rules = rules;
        self
    }

    /// Set the query cache capacity (0 disables caching)
    pub fn query_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.query_cache_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
