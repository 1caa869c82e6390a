//! Integration types.
//!
//! An integration is one notifier (slack, email, webhook, ...) attached to a
//! receiver. Its secure fields change representation as a set progresses:
//!
//! ```text
//! PostableIntegration   secureSettings + secureFields (wire)
//!        │  parse
//!        ▼
//! Integration           field -> SecretIntent::{Value, Unchanged}
//!        │  merge with previous
//!        ▼
//! ResolvedIntegration   field -> plaintext (delivery engine only)
//!        │  seal
//!        ▼
//! StoredIntegration     field -> ciphertext
//!        │  redact
//!        ▼
//! GettableIntegration   field -> true
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::core::types::{EncryptedValue, FieldName, Settings};

/// Fields shared by every representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationMeta {
    #[serde(default)]
    pub uid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub send_reminder: bool,
    #[serde(default)]
    pub disable_resolve_message: bool,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub settings: Settings,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Settings, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Read-only access used by schema validation and the delivery engine.
pub trait IntegrationView {
    fn meta(&self) -> &IntegrationMeta;

    /// Names of the secure fields this integration carries.
    fn secure_field_names(&self) -> Vec<&str>;
}

/// Integration as submitted by a client.
#[derive(Clone, Deserialize)]
pub struct PostableIntegration {
    #[serde(flatten)]
    pub meta: IntegrationMeta,
    #[serde(default, rename = "secureSettings")]
    pub secure_settings: Option<BTreeMap<FieldName, String>>,
    #[serde(default, rename = "secureFields")]
    pub secure_fields: Option<BTreeMap<FieldName, bool>>,
}

impl fmt::Debug for PostableIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let supplied: Vec<&String> = self.secure_settings.iter().flat_map(|s| s.keys()).collect();
        f.debug_struct("PostableIntegration")
            .field("meta", &self.meta)
            .field("secure_settings", &supplied)
            .field("secure_fields", &self.secure_fields)
            .finish()
    }
}

/// What the client wants done with one secure field.
///
/// A field missing from the map is absent: it is cleared on save.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretIntent {
    /// Replace the stored value with this plaintext.
    Value(Zeroizing<String>),
    /// Keep whatever is stored.
    Unchanged,
}

impl fmt::Debug for SecretIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Value(<redacted>)"),
            Self::Unchanged => f.write_str("Unchanged"),
        }
    }
}

/// Integration after parsing, with one intent per mentioned secure field.
#[derive(Debug, Clone)]
pub struct Integration {
    pub meta: IntegrationMeta,
    pub secrets: BTreeMap<FieldName, SecretIntent>,
}

impl From<PostableIntegration> for Integration {
    /// A supplied value wins over a presence flag; a `false` flag means absent.
    fn from(posted: PostableIntegration) -> Self {
        let mut secrets: BTreeMap<FieldName, SecretIntent> = posted
            .secure_fields
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(field, _)| (field, SecretIntent::Unchanged))
            .collect();

        for (field, value) in posted.secure_settings.unwrap_or_default() {
            secrets.insert(field, SecretIntent::Value(Zeroizing::new(value)));
        }

        Self {
            meta: posted.meta,
            secrets,
        }
    }
}

impl IntegrationView for Integration {
    fn meta(&self) -> &IntegrationMeta {
        &self.meta
    }

    fn secure_field_names(&self) -> Vec<&str> {
        self.secrets.keys().map(String::as_str).collect()
    }
}

/// A resolved secure field: its plaintext, plus the ciphertext it came from
/// when it was carried forward unchanged.
#[derive(Clone)]
pub struct ResolvedSecret {
    value: Zeroizing<String>,
    sealed: Option<EncryptedValue>,
}

impl ResolvedSecret {
    pub fn supplied(value: Zeroizing<String>) -> Self {
        Self {
            value,
            sealed: None,
        }
    }

    pub fn carried(value: Zeroizing<String>, sealed: EncryptedValue) -> Self {
        Self {
            value,
            sealed: Some(sealed),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Stored ciphertext this value was decrypted from, if any.
    pub fn sealed(&self) -> Option<&str> {
        self.sealed.as_deref()
    }
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("carried", &self.sealed.is_some())
            .finish_non_exhaustive()
    }
}

/// Integration with plaintext secure fields, handed to the delivery engine.
#[derive(Debug, Clone)]
pub struct ResolvedIntegration {
    pub meta: IntegrationMeta,
    pub secure_settings: BTreeMap<FieldName, ResolvedSecret>,
}

impl ResolvedIntegration {
    /// Plaintext value of a secure field.
    pub fn secret(&self, field: &str) -> Option<&str> {
        self.secure_settings.get(field).map(ResolvedSecret::value)
    }
}

impl IntegrationView for ResolvedIntegration {
    fn meta(&self) -> &IntegrationMeta {
        &self.meta
    }

    fn secure_field_names(&self) -> Vec<&str> {
        self.secure_settings.keys().map(String::as_str).collect()
    }
}

/// Persisted form: secure fields as ciphertext plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIntegration {
    pub id: u64,
    #[serde(flatten)]
    pub meta: IntegrationMeta,
    #[serde(default)]
    pub secure_settings: BTreeMap<FieldName, EncryptedValue>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl StoredIntegration {
    /// Read form: every stored secret reported as present, nothing else.
    pub fn redact(&self) -> GettableIntegration {
        GettableIntegration {
            id: self.id,
            meta: self.meta.clone(),
            created: self.created,
            updated: self.updated,
            secure_fields: self
                .secure_settings
                .keys()
                .map(|field| (field.clone(), true))
                .collect(),
        }
    }
}

impl IntegrationView for StoredIntegration {
    fn meta(&self) -> &IntegrationMeta {
        &self.meta
    }

    fn secure_field_names(&self) -> Vec<&str> {
        self.secure_settings.keys().map(String::as_str).collect()
    }
}

/// Read form returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GettableIntegration {
    pub id: u64,
    #[serde(flatten)]
    pub meta: IntegrationMeta,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub secure_fields: BTreeMap<FieldName, bool>,
}
