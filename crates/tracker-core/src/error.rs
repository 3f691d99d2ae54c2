use std::path::PathBuf;
use thiserror::Error;

/// Coarse error category, used by the UI shell to pick a message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input; nothing was written.
    Validation,
    /// Wrong reset secret; nothing was written.
    Authorization,
    /// Local storage could not be read or written.
    Persistence,
    /// A configuration value is missing or invalid.
    Config,
}

/// All errors produced by the E-Bill Tracker.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Input rejected before touching storage (bad date, negative value,
    /// inverted range, invalid appliance).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The supplied reset secret did not match the configured one.
    #[error("Incorrect reset secret; data was not reset")]
    Authorization,

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written or atomically replaced.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored JSON document exists but could not be decoded.
    #[error("File {path} is corrupted: {source}")]
    CorruptFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    /// Shorthand for building a [`TrackerError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Map the error to its category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authorization => ErrorKind::Authorization,
            Self::FileRead { .. } | Self::FileWrite { .. } | Self::CorruptFile { .. } => {
                ErrorKind::Persistence
            }
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Convenience alias used throughout the tracker crates.
pub type Result<T> = std::result::Result<T, TrackerError>;
