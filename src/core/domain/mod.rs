//! Domain types.

mod document;
mod integration;

pub use document::{AlertingConfig, Receiver, Route, UserConfig};
pub use integration::{
    GettableIntegration, Integration, IntegrationMeta, IntegrationView, PostableIntegration,
    ResolvedIntegration, ResolvedSecret, SecretIntent, StoredIntegration,
};

/// Document as submitted by a client.
pub type PostableConfig = UserConfig<PostableIntegration>;

/// Parsed document carrying per-field secret intents.
pub type CandidateConfig = UserConfig<Integration>;

/// Document with plaintext secrets, only ever handed to the delivery engine.
pub type ResolvedConfig = UserConfig<ResolvedIntegration>;

/// Document as persisted, secrets encrypted.
pub type StoredConfig = UserConfig<StoredIntegration>;

/// Document as returned to readers, secrets reduced to presence flags.
pub type GettableConfig = UserConfig<GettableIntegration>;

impl PostableConfig {
    /// Decide each secure field's intent once, at the parsing boundary.
    pub fn into_candidate(self) -> CandidateConfig {
        match self.try_map(|_, posted| Ok::<_, std::convert::Infallible>(posted.into())) {
            Ok(candidate) => candidate,
            Err(never) => match never {},
        }
    }
}

impl StoredConfig {
    pub fn redact(&self) -> GettableConfig {
        self.map_ref(|_, stored| stored.redact())
    }
}
