//! JSON file persistence shared by the reading log, the appliance list and
//! the tracker configuration.
//!
//! Writes go to a sibling `*.tmp` file which is flushed to disk and then
//! renamed over the target, so readers only ever see the old or the new
//! document in full.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};

/// Load a JSON document from `path`.
///
/// A missing file yields `T::default()`; any other I/O failure or a document
/// that does not decode is an error.
pub fn load_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found, starting empty", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(TrackerError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&content).map_err(|source| TrackerError::CorruptFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically replace `path` with the pretty-printed JSON form of `value`,
/// creating parent directories if needed.
pub fn save_json_atomic<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize,
{
    let write_err = |source: std::io::Error| TrackerError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| write_err(std::io::Error::other(e)))?;

    let tmp = tmp_path(path);
    if let Err(e) = write_synced(&tmp, json.as_bytes()) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        warn!("rename {} -> {} failed: {}", tmp.display(), path.display(), e);
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    debug!("wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

/// Delete `path` if it exists.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(TrackerError::FileWrite {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
