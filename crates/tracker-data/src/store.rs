//! The append-only reading log.
//!
//! Readings live in `readings.json` inside the data directory, in insertion
//! order. Every call re-reads the file, so there is no cached state to go
//! stale and no file handle outlives the operation.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tracker_core::config::TrackerConfig;
use tracker_core::models::{DateRange, Reading};
use tracker_core::storage;
use tracker_core::time_utils::parse_reading_date;
use tracker_core::{Result, TrackerError};

/// On-disk layout of the reading log.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ReadingLog {
    #[serde(default)]
    readings: Vec<Reading>,
}

/// Persistent, append-only store of meter readings.
#[derive(Debug, Clone)]
pub struct ReadingStore {
    path: PathBuf,
    reset_secret: String,
}

impl ReadingStore {
    /// Store backed by `path`, guarded by the reset secret from `config`.
    pub fn new(path: impl Into<PathBuf>, config: &TrackerConfig) -> Self {
        Self {
            path: path.into(),
            reset_secret: config.reset_secret.clone(),
        }
    }

    /// Store backed by `readings.json` inside `data_dir`.
    pub fn in_dir(data_dir: &Path, config: &TrackerConfig) -> Self {
        Self::new(data_dir.join("readings.json"), config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and append a reading, persisting before returning.
    pub fn add_reading(&self, date: NaiveDate, value: f64) -> Result<Reading> {
        let reading = Reading::new(date, value)?;

        let mut log = self.load()?;
        log.readings.push(reading.clone());
        storage::save_json_atomic(&self.path, &log)?;

        info!(
            "recorded reading {:.2} on {} ({} total)",
            reading.value,
            reading.date,
            log.readings.len()
        );
        Ok(reading)
    }

    /// Parse form text and append. Bad dates and non-numeric values are
    /// validation errors.
    pub fn add_reading_input(&self, date_text: &str, value_text: &str) -> Result<Reading> {
        let date = parse_reading_date(date_text)?;
        let value = parse_value(value_text)?;
        self.add_reading(date, value)
    }

    /// All readings, optionally restricted to `filter`, ordered by date.
    /// Readings sharing a date keep their insertion order.
    pub fn list_readings(&self, filter: Option<&DateRange>) -> Result<Vec<Reading>> {
        let mut readings = self.load()?.readings;
        if let Some(range) = filter {
            readings.retain(|r| range.contains(r.date));
        }
        readings.sort_by_key(|r| r.date);
        Ok(readings)
    }

    /// The most recent reading by date, if any.
    pub fn current_reading(&self) -> Result<Option<Reading>> {
        Ok(self.list_readings(None)?.pop())
    }

    /// Check `secret` without touching the log.
    pub fn verify_secret(&self, secret: &str) -> bool {
        secret == self.reset_secret
    }

    /// Erase every reading when `secret` matches.
    ///
    /// The log file is atomically replaced by an empty log, so a failed write
    /// leaves the previous contents in place.
    pub fn reset_all(&self, secret: &str) -> Result<()> {
        if !self.verify_secret(secret) {
            warn!("reset rejected: incorrect secret");
            return Err(TrackerError::Authorization);
        }
        storage::save_json_atomic(&self.path, &ReadingLog::default())?;
        info!("reading log reset");
        Ok(())
    }

    fn load(&self) -> Result<ReadingLog> {
        let log: ReadingLog = storage::load_json(&self.path)?;
        debug!(
            "loaded {} readings from {}",
            log.readings.len(),
            self.path.display()
        );
        Ok(log)
    }
}

/// Parse a meter value typed by the user.
pub fn parse_value(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation("meter reading is required"));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| TrackerError::validation(format!("\"{}\" is not a number", trimmed)))
}
