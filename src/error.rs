//! Error types.
//!
//! One top-level [`Error`] wraps a sub-enum per concern. The variants map
//! onto the client/server split the interface layer needs: schema, secret
//! reference and apply failures are the caller's fault and leave the stored
//! configuration untouched; cipher and storage failures are ours.

use serde::Serialize;
use thiserror::Error;

/// Message attached to every failed set.
pub const SET_FAILED_MESSAGE: &str = "failed to save and apply Alertmanager configuration";

/// Message attached to every failed get.
pub const GET_FAILED_MESSAGE: &str = "failed to get Alertmanager configuration";

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("receiver '{integration}' marks secure field '{field}' unchanged but no stored value exists")]
    UnresolvableSecret { integration: String, field: String },

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The delivery engine accepted the configuration but the write failed.
    /// The engine and the store now disagree until an operator reconciles.
    #[error("configuration for tenant '{tenant}' applied but not persisted: {source}")]
    NotPersisted {
        tenant: String,
        #[source]
        source: StoreError,
    },

    #[error("a configuration update for tenant '{0}' is already in progress")]
    Conflict(String),

    #[error("no configuration stored for tenant '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("invalid document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural problems with a submitted document.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown receiver type '{kind}' for '{integration}'")]
    UnknownType { integration: String, kind: String },

    #[error("receiver '{integration}' of type '{kind}' has no secure field '{field}'")]
    UnknownSecureField {
        integration: String,
        kind: String,
        field: String,
    },

    #[error("receiver '{integration}' is missing required setting '{field}'")]
    MissingSetting { integration: String, field: &'static str },

    #[error("receiver name must not be empty")]
    EmptyReceiverName,

    #[error("integration name must not be empty")]
    EmptyIntegrationName,

    #[error("duplicate receiver name '{0}'")]
    DuplicateReceiver(String),

    #[error("duplicate integration name '{0}'")]
    DuplicateIntegration(String),

    #[error("duplicate integration uid '{0}'")]
    DuplicateUid(String),

    #[error("route does not specify a receiver")]
    MissingRootReceiver,

    #[error("route references undefined receiver '{0}'")]
    UndefinedReceiver(String),

    #[error("invalid tenant id '{0}'")]
    InvalidTenant(String),
}

/// Rejections from the delivery engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("alert validation error: {0}")]
    Rejected(String),

    #[error("delivery engine did not answer within {0} ms")]
    Timeout(u64),

    #[error("delivery engine unavailable: {0}")]
    Unavailable(String),

    /// An earlier apply for the tenant timed out and has not returned yet.
    #[error("an earlier configuration is still being applied")]
    InFlight,
}

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Ciphertext failed its integrity check or could not be decoded.
    #[error("stored secret is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read stored configuration: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write configuration: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to lock stored configuration: {0}")]
    Lock(#[source] std::io::Error),

    #[error("stored configuration is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("no secret key found at {0} (run: alertcfg keygen)")]
    NoKey(String),

    #[error("secret key already exists at {0}")]
    AlreadyExists(String),

    #[error("invalid secret key: {0}")]
    InvalidFormat(String),

    #[error("failed to read secret key: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write secret key: {0}")]
    WriteFailed(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Failure payload handed to the interface layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl Error {
    /// Whether the caller caused the failure (configuration left unchanged).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Schema(_)
                | Error::UnresolvableSecret { .. }
                | Error::Apply(_)
                | Error::Parse(_)
                | Error::Conflict(_)
                | Error::NotFound(_)
        )
    }

    /// HTTP-style status code for the interface layer.
    pub fn status(&self) -> u16 {
        match self {
            Error::Schema(_) | Error::UnresolvableSecret { .. } | Error::Apply(_) | Error::Parse(_) => {
                400
            }
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// Whether the delivery engine is running a configuration the store lacks.
    pub fn is_drift(&self) -> bool {
        matches!(self, Error::NotPersisted { .. })
    }

    /// Build the `{error, message}` payload for a failed set.
    pub fn response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            message: SET_FAILED_MESSAGE.to_string(),
        }
    }

    /// Build the `{error, message}` payload for a failed read.
    pub fn read_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            message: GET_FAILED_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
