//! Settings file management.
//!
//! Handles reading and validating `alertcfg.toml`. Every section is
//! optional; a missing file means all defaults. Relative paths resolve
//! against the directory holding the settings file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::applier::{Deadline, NotifierCheck};
use crate::core::cipher::Codec;
use crate::core::constants;
use crate::core::defaults::{BuiltinDefault, FileDefault};
use crate::core::keys;
use crate::core::manager::ConfigManager;
use crate::core::schema;
use crate::core::store::FileStore;
use crate::error::{Result, SettingsError};

/// Settings stored in `alertcfg.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub keys: KeySettings,
    pub apply: ApplySettings,
    pub defaults: DefaultSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory holding one JSON document per tenant
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    /// Secret key file, overridden by `ALERTCFG_SECRET_KEY`
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplySettings {
    /// How long the delivery engine gets to accept a configuration
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    /// Bootstrap document; the built-in one when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Tenant used when a command doesn't name one
    pub tenant: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::STORE_DIR),
        }
    }
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(constants::KEY_FILE),
        }
    }
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            timeout_ms: constants::APPLY_TIMEOUT_MS,
        }
    }
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            file: None,
            tenant: constants::DEFAULT_TENANT.to_string(),
        }
    }
}

impl Settings {
    /// Path to the settings file in the current directory
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::SETTINGS_FILE)
    }

    /// Load settings from `path`, or defaults if it doesn't exist.
    ///
    /// Relative store, key and default-document paths are anchored at
    /// `path`'s directory.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Parse` if the TOML is malformed, or
    /// `SettingsError::InvalidValue` if a value fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");

        let settings = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(SettingsError::ReadFile)?;
            toml::from_str(&contents).map_err(SettingsError::Parse)?
        } else {
            debug!("settings file not found, using defaults");
            Self::default()
        };

        settings.validate()?;
        Ok(settings.anchored_at(path.parent().unwrap_or_else(|| Path::new(""))))
    }

    /// Resolve relative paths against `base`.
    fn anchored_at(mut self, base: &Path) -> Self {
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        anchor(&mut self.store.dir);
        anchor(&mut self.keys.file);
        if let Some(file) = self.defaults.file.as_mut() {
            anchor(file);
        }
        self
    }

    /// Validate the settings values
    ///
    /// Checks:
    /// - Store directory and key file are non-empty
    /// - Apply timeout is positive
    /// - Default tenant is a valid tenant id
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.store.dir.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue {
                field: "store.dir",
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.keys.file.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue {
                field: "keys.file",
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.apply.timeout_ms == 0 {
            return Err(SettingsError::InvalidValue {
                field: "apply.timeout_ms",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if schema::validate_tenant(&self.defaults.tenant).is_err() {
            return Err(SettingsError::InvalidValue {
                field: "defaults.tenant",
                reason: format!("not a valid tenant id: {:?}", self.defaults.tenant),
            }
            .into());
        }

        Ok(())
    }

    pub fn apply_timeout(&self) -> Duration {
        Duration::from_millis(self.apply.timeout_ms)
    }

    /// Build a manager backed by the file store, the loaded key and the
    /// built-in notifier checks.
    ///
    /// # Errors
    ///
    /// Returns `KeyError` if the secret key cannot be loaded.
    pub fn open_manager(&self) -> Result<ConfigManager> {
        let codec = Codec::new(keys::load(&self.keys.file)?);
        let store = Arc::new(FileStore::new(&self.store.dir));
        let applier = Arc::new(Deadline::new(NotifierCheck, self.apply_timeout()));

        let manager = ConfigManager::new(store, applier, codec);
        Ok(match &self.defaults.file {
            Some(path) => manager.with_defaults(FileDefault::new(path)),
            None => manager.with_defaults(BuiltinDefault),
        })
    }
}
