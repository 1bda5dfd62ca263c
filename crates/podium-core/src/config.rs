//! Layered configuration for boards and the store's retry loop.
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: hardcoded in the `Default` implementations
//! 2. **Config file**: TOML file named by the `PODIUM_CONFIG` env var
//! 3. **Environment variables**: `PODIUM_*` overrides for specific fields
//!
//! Configuration is validated at load time; a zero capacity or name length
//! is an error rather than a silently degenerate leaderboard.
//!
//! # Example
//!
//! ```toml
//! [board]
//! capacity = 20
//! max_name_len = 50
//!
//! [store]
//! max_retries = 32
//! ```

use crate::store::memory::DEFAULT_RETRY_BUDGET;
use crate::types::{CAPACITY, MAX_NAME_LEN};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-board settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Maximum entries retained per leaderboard. Defaults to `20`.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Display names are truncated to this many characters on write.
    /// Defaults to `50`.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
}

fn default_capacity() -> usize {
    CAPACITY
}

fn default_max_name_len() -> usize {
    MAX_NAME_LEN
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            capacity: CAPACITY,
            max_name_len: MAX_NAME_LEN,
        }
    }
}

/// Settings for the in-process store's conflict retry loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Conflict retries before a transaction reports the store unavailable.
    /// Defaults to `32`.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

fn default_max_retries() -> usize {
    DEFAULT_RETRY_BUDGET
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_RETRY_BUDGET,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodiumConfig {
    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl PodiumConfig {
    /// Loads configuration from compiled defaults, an optional TOML file
    /// named by `PODIUM_CONFIG`, and `PODIUM_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Ok(path) = std::env::var("PODIUM_CONFIG") {
            builder = builder.add_source(File::from(Path::new(&path)));
        }
        let settings = builder
            .add_source(Environment::with_prefix("PODIUM").separator("__"))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects degenerate settings instead of failing silently later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.capacity == 0 {
            return Err(ConfigError::Message(
                "board.capacity must be greater than zero".to_string(),
            ));
        }
        if self.board.max_name_len == 0 {
            return Err(ConfigError::Message(
                "board.max_name_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
