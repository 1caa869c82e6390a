//! Secret merge resolver.
//!
//! Turns the per-field intents of a candidate document into final plaintext
//! values, using the previously stored document as the reference set:
//!
//! - `Value(v)`  → `v`, the only way a secret's content changes
//! - `Unchanged` → the stored value for the same integration, decrypted in
//!   memory and remembered with its ciphertext so it can be stored again
//!   byte-for-byte
//! - absent      → not in the result, which clears it on save

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::core::cipher::Codec;
use crate::core::domain::{
    CandidateConfig, Integration, IntegrationMeta, ResolvedConfig, ResolvedIntegration,
    ResolvedSecret, SecretIntent, StoredConfig, StoredIntegration,
};
use crate::core::schema;
use crate::error::{Error, Result};

/// Lookup of the previously stored integrations.
///
/// An integration matches a previous one by `uid` when it carries a known
/// one, otherwise by name. The notifier type must be the same either way,
/// and each stored integration matches at most one candidate.
pub struct PreviousIndex<'a> {
    stored: Vec<&'a StoredIntegration>,
    by_uid: HashMap<&'a str, usize>,
    by_name: HashMap<&'a str, usize>,
}

impl<'a> PreviousIndex<'a> {
    pub fn new(previous: Option<&'a StoredConfig>) -> Self {
        let stored: Vec<_> = previous
            .map(|previous| previous.integrations().map(|(_, i)| i).collect())
            .unwrap_or_default();
        let mut by_uid = HashMap::new();
        let mut by_name = HashMap::new();
        for (at, integration) in stored.iter().enumerate() {
            if !integration.meta.uid.is_empty() {
                by_uid.insert(integration.meta.uid.as_str(), at);
            }
            by_name.insert(integration.meta.name.as_str(), at);
        }
        Self {
            stored,
            by_uid,
            by_name,
        }
    }

    /// Pair each candidate, in order, with the stored integration it
    /// continues.
    ///
    /// Uid matches are settled first so a renamed integration keeps its
    /// identity even when a new one takes over its old name. A candidate
    /// whose uid is known never falls back to a name match.
    pub fn assign<'m>(
        &self,
        candidates: impl Iterator<Item = &'m IntegrationMeta>,
    ) -> Vec<Option<&'a StoredIntegration>> {
        let candidates: Vec<_> = candidates.collect();
        let mut claimed = vec![false; self.stored.len()];
        let mut matches = vec![None; candidates.len()];
        let mut by_uid = vec![false; candidates.len()];

        for (slot, meta) in candidates.iter().enumerate() {
            if meta.uid.is_empty() {
                continue;
            }
            if let Some(&at) = self.by_uid.get(meta.uid.as_str()) {
                by_uid[slot] = true;
                if !claimed[at] && self.stored[at].meta.kind == meta.kind {
                    claimed[at] = true;
                    matches[slot] = Some(self.stored[at]);
                }
            }
        }

        for (slot, meta) in candidates.iter().enumerate() {
            if by_uid[slot] {
                continue;
            }
            if let Some(&at) = self.by_name.get(meta.name.as_str()) {
                if !claimed[at] && self.stored[at].meta.kind == meta.kind {
                    claimed[at] = true;
                    matches[slot] = Some(self.stored[at]);
                }
            }
        }

        matches
    }

    /// Highest id in use, for numbering new integrations.
    pub fn max_id(&self) -> u64 {
        self.stored.iter().map(|s| s.id).max().unwrap_or(0)
    }
}

/// Resolve one integration's secure fields.
///
/// # Errors
///
/// Returns `SchemaError` if the type is unknown or doesn't declare a field,
/// `Error::UnresolvableSecret` if a field is marked unchanged but nothing is
/// stored for it, and `CipherError::Corrupt` if the stored value fails its
/// integrity check.
pub fn resolve(
    candidate: Integration,
    previous: Option<&StoredIntegration>,
    codec: &Codec,
) -> Result<ResolvedIntegration> {
    let Integration { meta, secrets } = candidate;
    let schema = schema::lookup(&meta.name, &meta.kind)?;

    let mut secure_settings = BTreeMap::new();
    for (field, intent) in secrets {
        schema.check_secure_field(&meta.name, &field)?;

        let secret = match intent {
            SecretIntent::Value(value) => ResolvedSecret::supplied(value),
            SecretIntent::Unchanged => {
                let sealed = previous
                    .and_then(|stored| stored.secure_settings.get(&field))
                    .ok_or_else(|| Error::UnresolvableSecret {
                        integration: meta.name.clone(),
                        field: field.clone(),
                    })?;
                debug!(integration = %meta.name, field = %field, "carrying secure field forward");
                ResolvedSecret::carried(codec.open(sealed)?, sealed.clone())
            }
        };
        secure_settings.insert(field, secret);
    }

    Ok(ResolvedIntegration {
        meta,
        secure_settings,
    })
}

/// Resolve every integration of a candidate document.
pub fn resolve_config(
    candidate: CandidateConfig,
    previous: Option<&StoredConfig>,
    codec: &Codec,
) -> Result<ResolvedConfig> {
    let mut matches = PreviousIndex::new(previous)
        .assign(candidate.integrations().map(|(_, i)| &i.meta))
        .into_iter();
    candidate.try_map(|_, integration| resolve(integration, matches.next().flatten(), codec))
}
