//! In-memory storage.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::Store;
use crate::core::domain::StoredConfig;
use crate::core::types::TenantId;
use crate::error::{Result, StoreError};

#[derive(Debug, Default)]
struct Slot {
    current: Option<StoredConfig>,
    previous: Option<StoredConfig>,
}

/// Process-local store. Replacement happens under a write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<TenantId, Slot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load(&self, tenant: &str) -> Result<Option<StoredConfig>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(tenant).and_then(|slot| slot.current.clone()))
    }

    fn load_previous(&self, tenant: &str) -> Result<Option<StoredConfig>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(tenant).and_then(|slot| slot.previous.clone()))
    }

    fn replace(&self, tenant: &str, config: &StoredConfig) -> std::result::Result<(), StoreError> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(tenant.to_string()).or_default();
        slot.previous = slot.current.replace(config.clone());
        Ok(())
    }
}
