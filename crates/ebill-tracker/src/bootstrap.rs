use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name of the default log inside `<data_dir>/logs/`.
pub const LOG_FILE_NAME: &str = "ebill-tracker.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the data directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `<data_dir>/`
/// - `<data_dir>/logs/`
pub fn ensure_directories(data_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    std::fs::create_dir_all(data_dir.join("logs"))
        .with_context(|| format!("creating log directory under {}", data_dir.display()))?;
    Ok(())
}

/// `--log-file` if given, otherwise `<data_dir>/logs/ebill-tracker.log`.
pub fn log_file_path(explicit: Option<&PathBuf>, data_dir: &Path) -> PathBuf {
    explicit
        .cloned()
        .unwrap_or_else(|| data_dir.join("logs").join(LOG_FILE_NAME))
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` value onto a tracing filter directive.
pub fn normalise_level(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber, appending to `log_file`.
///
/// The terminal belongs to the UI, so nothing is written to stdout or
/// stderr. Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str, log_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("installing the tracing subscriber")?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
