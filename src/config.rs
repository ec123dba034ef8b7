//! Session configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use crate::scoring::DEFAULT_SCOREBOARD_SIZE;
use crate::services::storage::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// How long the sensor gets to produce its first valid reading.
pub const DEFAULT_SENSOR_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuesserConfig {
    /// Milliseconds to wait for the first valid reading before declaring the
    /// sensor unresponsive.
    pub sensor_timeout_ms: u64,

    /// Key the guess list is stored under.
    pub storage_key: String,

    /// Entries shown on the review scoreboard.
    pub scoreboard_size: usize,

    /// Start with a dummy orientation and skip the sensor responsiveness
    /// check, for running on desktops without a tilt sensor.
    pub dev_mode: bool,
}

impl Default for GuesserConfig {
    fn default() -> Self {
        Self {
            sensor_timeout_ms: DEFAULT_SENSOR_TIMEOUT_MS,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            scoreboard_size: DEFAULT_SCOREBOARD_SIZE,
            dev_mode: false,
        }
    }
}

impl GuesserConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.scoreboard_size == 0 {
            return Err(ConfigError::Invalid {
                field: "scoreboard_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.sensor_timeout_ms)
    }
}
