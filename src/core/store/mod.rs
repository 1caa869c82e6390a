//! Configuration storage.
//!
//! A store holds one current document per tenant plus the document it
//! replaced. `replace` must be atomic: a concurrent `load` sees either the
//! whole old document or the whole new one.
//!
//! Stores shared between processes also hand out an exclusive per-tenant
//! [`SlotLock`]; the manager holds it from load to replace.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `Store` trait
//! 2. Add the implementation in a new file (e.g., `sql.rs`)
//! 3. Re-export from this module

use std::fs::File;

use crate::core::domain::StoredConfig;
use crate::error::{Result, StoreError};

mod fs;
mod memory;

pub use fs::FileStore;
pub use memory::MemoryStore;

/// Single-slot-per-tenant document storage.
pub trait Store: Send + Sync {
    /// Load the current document, or `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document exists but cannot be read.
    fn load(&self, tenant: &str) -> Result<Option<StoredConfig>>;

    /// Load the document the current one replaced.
    fn load_previous(&self, tenant: &str) -> Result<Option<StoredConfig>>;

    /// Replace the current document, keeping the old one as previous.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails; the current document is
    /// then unchanged.
    fn replace(&self, tenant: &str, config: &StoredConfig) -> std::result::Result<(), StoreError>;

    /// Take the tenant's slot lock, waiting for any other holder.
    ///
    /// The default is for stores only reachable from one process, where the
    /// manager's own lock already serializes writers.
    fn lock(&self, _tenant: &str) -> std::result::Result<SlotLock, StoreError> {
        Ok(SlotLock::local())
    }

    /// Take the tenant's slot lock, or `None` if someone else holds it.
    fn try_lock(&self, _tenant: &str) -> std::result::Result<Option<SlotLock>, StoreError> {
        Ok(Some(SlotLock::local()))
    }
}

/// Exclusive hold on one tenant's slot, released on drop.
#[derive(Debug)]
pub struct SlotLock {
    file: Option<File>,
}

impl SlotLock {
    /// A lock with nothing to release.
    pub fn local() -> Self {
        Self { file: None }
    }

    /// A lock backed by an exclusively locked file.
    pub fn file(file: File) -> Self {
        Self { file: Some(file) }
    }
}

impl Drop for SlotLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = fs4::FileExt::unlock(file);
        }
    }
}
