//! Configuration manager.
//!
//! Runs a set as one transaction:
//!
//! ```text
//! load previous ─► resolve secrets ─► validate ─► seal ─► apply ─► replace
//!                                                           │         │
//!                                          rejected: nothing stored   │
//!                                                    failed: NotPersisted
//! ```
//!
//! The delivery engine sees a document before the store does, so a
//! document the engine cannot run is never persisted. Sets on one tenant
//! are serialized; an overlapping set is rejected with `Error::Conflict`.
//! Within a process that is a lock table; across processes sharing a store
//! it is the store's slot lock, held from load to replace.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::core::applier::Applier;
use crate::core::cipher::Codec;
use crate::core::constants;
use crate::core::defaults::DefaultProvider;
use crate::core::domain::{
    GettableConfig, PostableConfig, ResolvedConfig, StoredConfig, StoredIntegration,
};
use crate::core::merge::{self, PreviousIndex};
use crate::core::schema;
use crate::core::store::Store;
use crate::core::types::TenantId;
use crate::error::{ApplyError, Error, Result};

/// Result of a successful set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The tenant had no stored configuration.
    Created,
    /// An existing configuration was replaced.
    Updated,
}

/// Success payload handed to the interface layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

impl SetOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }

    /// Acknowledgement payload. Clients see the same message whether the
    /// set created or replaced the configuration.
    pub fn response(&self) -> SuccessResponse {
        SuccessResponse {
            message: constants::CREATED_MESSAGE.to_string(),
        }
    }
}

/// Coordinates validation, secret merging, application and persistence.
pub struct ConfigManager {
    store: Arc<dyn Store>,
    applier: Arc<dyn Applier>,
    codec: Codec,
    defaults: Option<Box<dyn DefaultProvider>>,
    locks: Mutex<HashMap<TenantId, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("codec", &self.codec)
            .field("defaults", &self.defaults.is_some())
            .finish_non_exhaustive()
    }
}

impl ConfigManager {
    pub fn new(store: Arc<dyn Store>, applier: Arc<dyn Applier>, codec: Codec) -> Self {
        Self {
            store,
            applier,
            codec,
            defaults: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Seed tenants without a stored configuration from `provider` on read.
    pub fn with_defaults(mut self, provider: impl DefaultProvider + 'static) -> Self {
        self.defaults = Some(Box::new(provider));
        self
    }

    // --- Reads ---

    /// Current configuration with secure fields reduced to presence flags.
    ///
    /// If nothing is stored and a default provider is attached, the default
    /// document is applied and saved first, exactly like any other set.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if nothing is stored and there is no
    /// default provider, or any error from seeding the default.
    pub fn get(&self, tenant: &str) -> Result<GettableConfig> {
        schema::validate_tenant(tenant)?;

        if let Some(stored) = self.store.load(tenant)? {
            return Ok(stored.redact());
        }

        let Some(defaults) = self.defaults.as_ref() else {
            return Err(Error::NotFound(tenant.to_string()));
        };

        let lock = self.tenant_lock(tenant);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _slot = self.store.lock(tenant)?;

        // Another caller may have seeded while we waited
        if self.store.load(tenant)?.is_none() {
            info!(tenant, "no stored configuration, applying default");
            self.set_locked(tenant, defaults.default_config()?)?;
        }

        self.store
            .load(tenant)?
            .map(|stored| stored.redact())
            .ok_or_else(|| Error::NotFound(tenant.to_string()))
    }

    /// The configuration the current one replaced, redacted.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if there has been at most one set.
    pub fn previous(&self, tenant: &str) -> Result<GettableConfig> {
        schema::validate_tenant(tenant)?;
        self.store
            .load_previous(tenant)?
            .map(|stored| stored.redact())
            .ok_or_else(|| Error::NotFound(tenant.to_string()))
    }

    // --- Writes ---

    /// Apply a document to the delivery engine, then persist it.
    ///
    /// # Errors
    ///
    /// - `SchemaError`, `Error::UnresolvableSecret`, `ApplyError`: client
    ///   fault, nothing changed
    /// - `CipherError::Corrupt`: a stored secret failed its integrity check
    /// - `Error::Conflict`: another set for this tenant is in flight
    /// - `Error::NotPersisted`: applied, but the write failed
    pub fn set(&self, tenant: &str, document: PostableConfig) -> Result<SetOutcome> {
        schema::validate_tenant(tenant)?;

        let lock = self.tenant_lock(tenant);
        let _guard = match lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                warn!(tenant, "rejecting overlapping configuration update");
                return Err(Error::Conflict(tenant.to_string()));
            }
        };
        let Some(_slot) = self.store.try_lock(tenant)? else {
            warn!(tenant, "rejecting configuration update, store slot is locked elsewhere");
            return Err(Error::Conflict(tenant.to_string()));
        };

        self.set_locked(tenant, document)
    }

    /// Run every check a set runs, without applying or persisting.
    ///
    /// `checker` stands in for the delivery engine; it must not activate
    /// anything.
    pub fn check(&self, tenant: &str, document: PostableConfig, checker: &dyn Applier) -> Result<()> {
        schema::validate_tenant(tenant)?;
        let previous = self.store.load(tenant)?;
        let resolved = self.prepare(document, previous.as_ref())?;
        checker.apply(tenant, &resolved)?;
        Ok(())
    }

    fn prepare(
        &self,
        document: PostableConfig,
        previous: Option<&StoredConfig>,
    ) -> Result<ResolvedConfig> {
        let candidate = document.into_candidate();
        let resolved = merge::resolve_config(candidate, previous, &self.codec)?;
        schema::validate(&resolved)?;
        Ok(resolved)
    }

    fn set_locked(&self, tenant: &str, document: PostableConfig) -> Result<SetOutcome> {
        let previous = self.store.load(tenant)?;
        debug!(tenant, has_previous = previous.is_some(), "setting configuration");

        let resolved = self.prepare(document, previous.as_ref())?;
        let stored = self.seal(tenant, &resolved, previous.as_ref(), Utc::now())?;

        match self.applier.apply(tenant, &resolved) {
            Ok(()) => {}
            Err(ApplyError::InFlight) => {
                warn!(tenant, "rejecting configuration update, an earlier apply is still running");
                return Err(Error::Conflict(tenant.to_string()));
            }
            Err(e) => {
                warn!(tenant, error = %e, "delivery engine rejected configuration");
                return Err(e.into());
            }
        }
        drop(resolved);

        if let Err(source) = self.store.replace(tenant, &stored) {
            error!(
                tenant,
                error = %source,
                "configuration applied but not persisted; delivery engine and store have drifted"
            );
            return Err(Error::NotPersisted {
                tenant: tenant.to_string(),
                source,
            });
        }

        let outcome = if previous.is_some() {
            SetOutcome::Updated
        } else {
            SetOutcome::Created
        };
        info!(
            tenant,
            receivers = stored.receivers().len(),
            outcome = outcome.as_str(),
            "configuration committed"
        );
        Ok(outcome)
    }

    /// Encrypt secure fields and fill in bookkeeping.
    ///
    /// Carried-forward fields keep their exact ciphertext. Integrations
    /// matching a previous one keep its id, uid and creation time.
    fn seal(
        &self,
        tenant: &str,
        resolved: &ResolvedConfig,
        previous: Option<&StoredConfig>,
        now: DateTime<Utc>,
    ) -> Result<StoredConfig> {
        let index = PreviousIndex::new(previous);
        let mut next_id = index.max_id();
        let mut matches = index
            .assign(resolved.integrations().map(|(_, i)| &i.meta))
            .into_iter();

        resolved.try_map_ref(|receiver, integration| {
            let matched = matches.next().flatten();

            let mut secure_settings = std::collections::BTreeMap::new();
            for (field, secret) in &integration.secure_settings {
                let sealed = match secret.sealed() {
                    Some(sealed) => sealed.to_string(),
                    None => self.codec.seal(secret.value())?,
                };
                secure_settings.insert(field.clone(), sealed);
            }

            let mut meta = integration.meta.clone();
            let (id, created) = match matched {
                Some(stored) => {
                    if meta.uid.is_empty() {
                        meta.uid = stored.meta.uid.clone();
                    }
                    (stored.id, stored.created)
                }
                None => {
                    next_id += 1;
                    (next_id, now)
                }
            };
            if meta.uid.is_empty() {
                meta.uid = derive_uid(tenant, receiver, &meta.name, id);
            }

            Ok::<_, Error>(StoredIntegration {
                id,
                meta,
                secure_settings,
                created,
                updated: now,
            })
        })
    }

    fn tenant_lock(&self, tenant: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(tenant.to_string()).or_default())
    }
}

/// Stable uid for an integration that was saved without one. The id keeps
/// it unique when a name is reused for a new integration.
fn derive_uid(tenant: &str, receiver: &str, name: &str, id: u64) -> String {
    let digest = Sha256::digest(format!("{}/{}/{}/{}", tenant, receiver, name, id).as_bytes());
    digest[..9].iter().map(|b| format!("{:02x}", b)).collect()
}
