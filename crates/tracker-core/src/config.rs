use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::billing::DEFAULT_UNIT_RATE;
use crate::error::{Result, TrackerError};
use crate::storage;

/// Secret the reset prompt expects when none has been configured.
pub const DEFAULT_RESET_SECRET: &str = "reset123";

/// Process-wide tracker settings, loaded once at startup and handed to the
/// store and engine by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Currency charged per consumed unit.
    #[serde(default = "default_unit_rate")]
    pub unit_rate: f64,
    /// Value that must be typed to erase the reading log.
    #[serde(default = "default_reset_secret")]
    pub reset_secret: String,
}

fn default_unit_rate() -> f64 {
    DEFAULT_UNIT_RATE
}

fn default_reset_secret() -> String {
    DEFAULT_RESET_SECRET.to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            unit_rate: DEFAULT_UNIT_RATE,
            reset_secret: DEFAULT_RESET_SECRET.to_string(),
        }
    }
}

impl TrackerConfig {
    /// `config.json` inside `data_dir`.
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join("config.json")
    }

    /// Load and validate the configuration, falling back to defaults when
    /// the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = storage::load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate, then atomically write to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        storage::save_json_atomic(path, self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.unit_rate.is_finite() || self.unit_rate <= 0.0 {
            return Err(TrackerError::Config(format!(
                "unit rate must be a positive number, got {}",
                self.unit_rate
            )));
        }
        if self.reset_secret.is_empty() {
            return Err(TrackerError::Config(
                "reset secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy of this config with a different unit rate.
    pub fn with_unit_rate(&self, unit_rate: f64) -> Result<Self> {
        let updated = Self {
            unit_rate,
            ..self.clone()
        };
        updated.validate()?;
        Ok(updated)
    }
}
