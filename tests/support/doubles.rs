//! Test doubles for the delivery engine and the store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Barrier, Mutex};
use std::thread;
use std::time::Duration;

use alertcfg::core::applier::Applier;
use alertcfg::core::domain::{ResolvedConfig, StoredConfig};
use alertcfg::core::store::{MemoryStore, Store};
use alertcfg::error::{ApplyError, Result, StoreError};

/// Accepts everything and keeps a copy of what it was given.
#[derive(Default)]
pub struct RecordingApplier {
    applied: Mutex<Vec<ResolvedConfig>>,
}

impl RecordingApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    /// Plaintext of a secure field in the most recently applied document.
    pub fn last_secret(&self, integration: &str, field: &str) -> Option<String> {
        let applied = self.applied.lock().unwrap();
        let last = applied.last()?;
        let secret = last.integrations()
            .find(|(_, i)| i.meta.name == integration)
            .and_then(|(_, i)| i.secret(field).map(str::to_string));
        secret
    }

    /// Secure field names of an integration in the most recently applied
    /// document.
    pub fn last_fields(&self, integration: &str) -> Vec<String> {
        let applied = self.applied.lock().unwrap();
        applied
            .last()
            .and_then(|last| {
                last.integrations()
                    .find(|(_, i)| i.meta.name == integration)
                    .map(|(_, i)| i.secure_settings.keys().cloned().collect())
            })
            .unwrap_or_default()
    }
}

impl Applier for RecordingApplier {
    fn apply(&self, _tenant: &str, config: &ResolvedConfig) -> std::result::Result<(), ApplyError> {
        self.applied.lock().unwrap().push(config.clone());
        Ok(())
    }
}

/// Rejects everything with a fixed reason.
pub struct RejectingApplier {
    pub reason: String,
    pub calls: AtomicUsize,
}

impl RejectingApplier {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Applier for RejectingApplier {
    fn apply(&self, _tenant: &str, _config: &ResolvedConfig) -> std::result::Result<(), ApplyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ApplyError::Rejected(self.reason.clone()))
    }
}

/// Holds every apply until the test releases it.
///
/// `entered` trips once the applier is running; `release` lets it return.
pub struct GateApplier {
    pub entered: Barrier,
    pub release: Barrier,
}

impl GateApplier {
    pub fn new() -> Self {
        Self {
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }
}

impl Applier for GateApplier {
    fn apply(&self, _tenant: &str, _config: &ResolvedConfig) -> std::result::Result<(), ApplyError> {
        self.entered.wait();
        self.release.wait();
        Ok(())
    }
}

/// Sleeps through its first apply, then answers at once.
///
/// Records the slack recipient of every activation in the order the
/// activations land.
pub struct SlowFirstApplier {
    delay: Duration,
    started: AtomicBool,
    activations: Mutex<Vec<String>>,
}

impl SlowFirstApplier {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicBool::new(false),
            activations: Mutex::new(Vec::new()),
        }
    }

    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().unwrap().clone()
    }
}

impl Applier for SlowFirstApplier {
    fn apply(&self, _tenant: &str, config: &ResolvedConfig) -> std::result::Result<(), ApplyError> {
        if !self.started.swap(true, Ordering::SeqCst) {
            thread::sleep(self.delay);
        }
        let recipient = config
            .integrations()
            .find_map(|(_, i)| i.meta.settings.get("recipient")?.as_str().map(str::to_string))
            .unwrap_or_default();
        self.activations.lock().unwrap().push(recipient);
        Ok(())
    }
}

/// Memory store whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Store for FlakyStore {
    fn load(&self, tenant: &str) -> Result<Option<StoredConfig>> {
        self.inner.load(tenant)
    }

    fn load_previous(&self, tenant: &str) -> Result<Option<StoredConfig>> {
        self.inner.load_previous(tenant)
    }

    fn replace(&self, tenant: &str, config: &StoredConfig) -> std::result::Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.inner.replace(tenant, config)
    }
}
