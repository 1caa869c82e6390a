//! Default configuration.
//!
//! Supplies the document a tenant starts with before anyone has saved one.

use std::path::PathBuf;

use tracing::debug;

use crate::core::domain::PostableConfig;
use crate::error::{Result, StoreError};

/// Built-in bootstrap document: every alert goes to one placeholder email
/// receiver.
pub const DEFAULT_CONFIG_JSON: &str = r#"{
  "template_files": {},
  "alertmanager_config": {
    "route": {
      "receiver": "default-email"
    },
    "templates": null,
    "receivers": [
      {
        "name": "default-email",
        "grafana_managed_receiver_configs": [
          {
            "uid": "",
            "name": "email receiver",
            "type": "email",
            "isDefault": true,
            "settings": {
              "addresses": "<example@email.com>"
            }
          }
        ]
      }
    ]
  }
}"#;

/// Source of the bootstrap document.
pub trait DefaultProvider: Send + Sync {
    /// Produce the default document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed.
    fn default_config(&self) -> Result<PostableConfig>;
}

/// The embedded default document.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDefault;

impl DefaultProvider for BuiltinDefault {
    fn default_config(&self) -> Result<PostableConfig> {
        Ok(serde_json::from_str(DEFAULT_CONFIG_JSON)?)
    }
}

/// A default document read from a JSON file on every bootstrap.
#[derive(Debug, Clone)]
pub struct FileDefault {
    path: PathBuf,
}

impl FileDefault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DefaultProvider for FileDefault {
    fn default_config(&self) -> Result<PostableConfig> {
        debug!(path = %self.path.display(), "reading default configuration");
        let contents = std::fs::read_to_string(&self.path).map_err(StoreError::Read)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
