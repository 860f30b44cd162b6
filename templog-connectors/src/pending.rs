//! On-disk queue of measurements that could not be sent
//!
//! One pretty-printed JSON file per measurement, named
//! `<device_id>_<timestamp micros>.json`. Names sort by device and then by
//! sample time, so replay happens oldest first. A second measurement with
//! the same device and timestamp gets a `_<n>` suffix instead of replacing
//! the first.
//!
//! Files are written to a temporary name and moved into place, so a crash
//! mid-write never leaves a truncated `.json` behind. Files that can never be
//! sent are renamed to `.rejected` and drop out of the queue.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use templog_core::{LoggerError, LoggerResult, Measurement};

const FILE_EXT: &str = "json";
const REJECTED_EXT: &str = "rejected";

/// Directory of saved measurements
#[derive(Debug, Clone)]
pub struct PendingStore {
    dir: PathBuf,
}

impl PendingStore {
    /// Store in `dir`, which must already exist
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in `dir`, creating it if needed
    pub fn create(dir: impl Into<PathBuf>) -> LoggerResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `m` to disk, returning the file it went to
    pub fn save(&self, m: &Measurement) -> LoggerResult<PathBuf> {
        let json =
            serde_json::to_string_pretty(m).map_err(|e| LoggerError::Encode(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;

        let stem = format!("{}_{}", m.device_id(), m.timestamp().timestamp_micros());
        let mut seq = 0u32;
        loop {
            let path = match seq {
                0 => self.dir.join(format!("{stem}.{FILE_EXT}")),
                n => self.dir.join(format!("{stem}_{n}.{FILE_EXT}")),
            };

            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    log::info!("saved measurement {} to {}", m.db_key(), path.display());
                    return Ok(path);
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = e.file;
                    seq += 1;
                }
                Err(e) => return Err(e.error.into()),
            }
        }
    }

    /// Saved files, sorted by name
    pub fn list(&self) -> LoggerResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == FILE_EXT) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read one saved measurement
    pub fn load(&self, path: &Path) -> LoggerResult<Measurement> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| LoggerError::Encode(format!("{}: {e}", path.display())))
    }

    /// Delete one saved measurement
    pub fn remove(&self, path: &Path) -> LoggerResult<()> {
        fs::remove_file(path)?;
        Ok(())
    }

    /// Take a file out of the queue without deleting it
    pub fn quarantine(&self, path: &Path) -> LoggerResult<PathBuf> {
        let target = path.with_extension(REJECTED_EXT);
        fs::rename(path, &target)?;
        log::warn!("moved unsendable {} to {}", path.display(), target.display());
        Ok(target)
    }
}
