//! Notifier schema registry and structural validation.
//!
//! Validation here is about well-formedness only. Whether a configuration
//! can actually deliver (a slack token that is set, a URL that parses) is
//! the delivery engine's call.

use std::collections::HashSet;

use tracing::debug;

use crate::core::domain::{IntegrationView, UserConfig};
use crate::error::{Result, SchemaError};

/// Schema of one notifier type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierSchema {
    pub kind: &'static str,
    pub secure_fields: &'static [&'static str],
    pub required_settings: &'static [&'static str],
}

/// Every notifier type the delivery engine understands.
pub const NOTIFIERS: &[NotifierSchema] = &[
    NotifierSchema {
        kind: "email",
        secure_fields: &[],
        required_settings: &["addresses"],
    },
    NotifierSchema {
        kind: "slack",
        secure_fields: &["url", "token"],
        required_settings: &[],
    },
    NotifierSchema {
        kind: "webhook",
        secure_fields: &["password", "authorization_credentials"],
        required_settings: &["url"],
    },
    NotifierSchema {
        kind: "pagerduty",
        secure_fields: &["integrationKey"],
        required_settings: &[],
    },
    NotifierSchema {
        kind: "telegram",
        secure_fields: &["bottoken"],
        required_settings: &["chatid"],
    },
    NotifierSchema {
        kind: "discord",
        secure_fields: &["url"],
        required_settings: &[],
    },
    NotifierSchema {
        kind: "opsgenie",
        secure_fields: &["apiKey"],
        required_settings: &[],
    },
    NotifierSchema {
        kind: "teams",
        secure_fields: &[],
        required_settings: &["url"],
    },
];

/// Look up a notifier type.
///
/// # Errors
///
/// Returns `SchemaError::UnknownType` if the type is not registered.
pub fn lookup(integration: &str, kind: &str) -> Result<&'static NotifierSchema> {
    NOTIFIERS
        .iter()
        .find(|schema| schema.kind == kind)
        .ok_or_else(|| {
            SchemaError::UnknownType {
                integration: integration.to_string(),
                kind: kind.to_string(),
            }
            .into()
        })
}

impl NotifierSchema {
    /// Check that this notifier type declares a secure field.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownSecureField` otherwise.
    pub fn check_secure_field(&self, integration: &str, field: &str) -> Result<()> {
        if self.secure_fields.iter().any(|known| *known == field) {
            return Ok(());
        }
        Err(SchemaError::UnknownSecureField {
            integration: integration.to_string(),
            kind: self.kind.to_string(),
            field: field.to_string(),
        }
        .into())
    }
}

/// Validate a tenant id. Tenant ids double as file names.
///
/// Tenant ids must be non-empty and contain only ASCII letters, digits,
/// `-` and `_`.
pub fn validate_tenant(tenant: &str) -> Result<()> {
    let valid = !tenant.is_empty()
        && tenant
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid {
        return Err(SchemaError::InvalidTenant(tenant.to_string()).into());
    }
    Ok(())
}

/// Validate the structure of a document.
///
/// Checks:
/// - Receiver names are non-empty and unique
/// - Integration names are non-empty and unique across the document, and
///   so are the uids that are set
/// - Every integration has a known type, known secure fields and its
///   required settings
/// - The root route names a receiver and every route reference resolves
///
/// # Errors
///
/// Returns the first `SchemaError` found.
pub fn validate<I: IntegrationView>(config: &UserConfig<I>) -> Result<()> {
    debug!(receivers = config.receivers().len(), "validating document");

    let mut receivers = HashSet::new();
    for receiver in config.receivers() {
        if receiver.name.trim().is_empty() {
            return Err(SchemaError::EmptyReceiverName.into());
        }
        if !receivers.insert(receiver.name.as_str()) {
            return Err(SchemaError::DuplicateReceiver(receiver.name.clone()).into());
        }
    }

    let mut integrations = HashSet::new();
    let mut uids = HashSet::new();
    for (_, integration) in config.integrations() {
        let meta = integration.meta();
        if meta.name.trim().is_empty() {
            return Err(SchemaError::EmptyIntegrationName.into());
        }
        if !integrations.insert(meta.name.as_str()) {
            return Err(SchemaError::DuplicateIntegration(meta.name.clone()).into());
        }
        if !meta.uid.is_empty() && !uids.insert(meta.uid.as_str()) {
            return Err(SchemaError::DuplicateUid(meta.uid.clone()).into());
        }

        let schema = lookup(&meta.name, &meta.kind)?;
        for field in integration.secure_field_names() {
            schema.check_secure_field(&meta.name, field)?;
        }
        for field in schema.required_settings {
            let present = meta
                .settings
                .get(*field)
                .map(|v| !v.is_null())
                .unwrap_or(false);
            if !present {
                return Err(SchemaError::MissingSetting {
                    integration: meta.name.clone(),
                    field: *field,
                }
                .into());
            }
        }
    }

    let route = &config.alertmanager_config.route;
    if route.receiver.trim().is_empty() {
        return Err(SchemaError::MissingRootReceiver.into());
    }
    for name in route.referenced_receivers() {
        if !receivers.contains(name) {
            return Err(SchemaError::UndefinedReceiver(name.to_string()).into());
        }
    }

    Ok(())
}
