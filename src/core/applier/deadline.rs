//! Time-bounded applier.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, warn};

use super::Applier;
use crate::core::domain::ResolvedConfig;
use crate::core::types::TenantId;
use crate::error::ApplyError;

/// Wraps an applier so a slow engine turns into `ApplyError::Timeout`.
///
/// The call runs on a worker thread. On timeout the set aborts as if the
/// engine had rejected the document, but the worker cannot be stopped, so
/// the tenant stays busy until it returns: further applies for that tenant
/// fail with `ApplyError::InFlight` in the meantime. A late activation is
/// logged as drift.
pub struct Deadline<A> {
    inner: Arc<A>,
    timeout: Duration,
    stragglers: Mutex<HashMap<TenantId, JoinHandle<()>>>,
}

impl<A> Deadline<A> {
    pub fn new(inner: A, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
            stragglers: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a timed-out apply for `tenant` is still running.
    pub fn is_busy(&self, tenant: &str) -> bool {
        let stragglers = self.stragglers.lock().unwrap_or_else(PoisonError::into_inner);
        stragglers
            .get(tenant)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A: Applier + 'static> Applier for Deadline<A> {
    fn apply(&self, tenant: &str, config: &ResolvedConfig) -> Result<(), ApplyError> {
        {
            let mut stragglers = self.stragglers.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = stragglers.remove(tenant) {
                if !handle.is_finished() {
                    warn!(tenant, "earlier timed-out apply still running");
                    stragglers.insert(tenant.to_string(), handle);
                    return Err(ApplyError::InFlight);
                }
                debug!(tenant, "reaping finished apply worker");
            }
        }

        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned_tenant = tenant.to_string();
        let owned_config = config.clone();

        let handle = thread::Builder::new()
            .name("alertcfg-apply".to_string())
            .spawn(move || {
                let result = inner.apply(&owned_tenant, &owned_config);
                let activated = result.is_ok();
                if tx.send(result).is_err() && activated {
                    error!(
                        tenant = %owned_tenant,
                        "timed-out configuration activated late; delivery engine and store have drifted"
                    );
                }
            })
            .map_err(|e| ApplyError::Unavailable(e.to_string()))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(tenant, timeout_ms = millis, "delivery engine timed out");
                self.stragglers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(tenant.to_string(), handle);
                Err(ApplyError::Timeout(millis))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ApplyError::Unavailable(
                "apply worker exited without answering".to_string(),
            )),
        }
    }
}
