use log::warn;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::holding::CachedHolding;

use super::format;

/// Low-level cache persistence: rows ⇄ bytes ⇄ file.
pub struct StorageManager;

impl StorageManager {
    /// Serialize cache rows into a versioned cache file image.
    ///
    /// Flow: rows → bincode → PFHC header + payload
    pub fn save_to_bytes(rows: &[CachedHolding]) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(rows)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize holdings: {e}")))?;
        Ok(format::write_file(format::SCHEMA_VERSION, &payload))
    }

    /// Parse a cache file image back into rows.
    pub fn load_from_bytes(data: &[u8]) -> Result<Vec<CachedHolding>, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize holdings: {e}")))
    }

    /// Write rows to `path`, replacing any previous file atomically
    /// (write to a sibling temp file, then rename over the target).
    pub fn save_to_file(rows: &[CachedHolding], path: &Path) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(rows)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(path);
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load rows from `path`.
    ///
    /// A missing file is an empty cache. A file this build cannot read
    /// (foreign magic, other schema version, truncated or undecodable payload)
    /// is deleted and treated as empty: the cache is disposable, so schema
    /// changes migrate destructively. Other I/O failures are returned.
    pub fn load_or_discard(path: &Path) -> Result<Vec<CachedHolding>, CoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match Self::load_from_bytes(&bytes) {
            Ok(rows) => Ok(rows),
            Err(
                e @ (CoreError::InvalidFileFormat(_)
                | CoreError::UnsupportedVersion(_)
                | CoreError::Deserialization(_)),
            ) => {
                warn!("Discarding unreadable holdings cache {}: {e}", path.display());
                Self::delete_file(path)?;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the cache file. A file that is already gone is not an error.
    pub fn delete_file(path: &Path) -> Result<(), CoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
