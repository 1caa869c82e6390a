//! Filesystem-based storage.
//!
//! Each tenant's current document lives in `<dir>/<tenant>.json` and the
//! one before it in `<dir>/<tenant>.previous.json`. A replace writes both
//! files to uniquely named temporary siblings first and renames them into
//! place, so a reader never observes a partially written file.
//!
//! Writers in different processes serialize on `<dir>/.<tenant>.lock`
//! through an exclusive advisory lock.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs4::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{SlotLock, Store};
use crate::core::domain::StoredConfig;
use crate::error::{Result, StoreError};

/// Directory-backed store. Tenant ids are validated before they reach it.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn current_path(&self, tenant: &str) -> PathBuf {
        self.dir.join(format!("{}.json", tenant))
    }

    fn previous_path(&self, tenant: &str) -> PathBuf {
        self.dir.join(format!("{}.previous.json", tenant))
    }

    fn lock_path(&self, tenant: &str) -> PathBuf {
        self.dir.join(format!(".{}.lock", tenant))
    }

    fn open_lock(&self, tenant: &str) -> std::result::Result<fs::File, StoreError> {
        fs::create_dir_all(&self.dir).map_err(StoreError::Lock)?;
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path(tenant))
            .map_err(StoreError::Lock)
    }

    /// Write `contents` to a fresh temporary file beside the store files.
    fn stage(&self, contents: &[u8]) -> std::result::Result<NamedTempFile, StoreError> {
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(StoreError::Write)?;
        staged.write_all(contents).map_err(StoreError::Write)?;
        staged.as_file().sync_all().map_err(StoreError::Write)?;
        Ok(staged)
    }

    fn read(path: &Path) -> Result<Option<StoredConfig>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read(e).into()),
        };
        let config = serde_json::from_str(&contents).map_err(StoreError::Malformed)?;
        Ok(Some(config))
    }
}

impl Store for FileStore {
    fn load(&self, tenant: &str) -> Result<Option<StoredConfig>> {
        let path = self.current_path(tenant);
        debug!(path = %path.display(), "loading stored configuration");
        Self::read(&path)
    }

    fn load_previous(&self, tenant: &str) -> Result<Option<StoredConfig>> {
        Self::read(&self.previous_path(tenant))
    }

    fn replace(&self, tenant: &str, config: &StoredConfig) -> std::result::Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(StoreError::Write)?;

        let contents = serde_json::to_vec_pretty(config).map_err(StoreError::Malformed)?;
        let staged = self.stage(&contents)?;

        let current = self.current_path(tenant);
        let outgoing = match fs::read(&current) {
            Ok(bytes) => Some(self.stage(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::Read(e)),
        };

        staged
            .persist(&current)
            .map_err(|e| StoreError::Write(e.error))?;

        // The new document is in place; losing the history is not worth
        // failing an applied set over.
        if let Some(outgoing) = outgoing {
            let previous = self.previous_path(tenant);
            if let Err(e) = outgoing.persist(&previous) {
                warn!(path = %previous.display(), error = %e.error, "failed to keep previous configuration");
            }
        }

        debug!(path = %current.display(), "stored configuration replaced");
        Ok(())
    }

    fn lock(&self, tenant: &str) -> std::result::Result<SlotLock, StoreError> {
        let file = self.open_lock(tenant)?;
        file.lock_exclusive().map_err(StoreError::Lock)?;
        Ok(SlotLock::file(file))
    }

    fn try_lock(&self, tenant: &str) -> std::result::Result<Option<SlotLock>, StoreError> {
        let file = self.open_lock(tenant)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(SlotLock::file(file))),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                debug!(tenant, "slot lock held elsewhere");
                Ok(None)
            }
            Err(e) => Err(StoreError::Lock(e)),
        }
    }
}
