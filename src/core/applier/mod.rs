//! Backend applier.
//!
//! The seam between this crate and the live delivery engine. An applier
//! receives the fully resolved document, plaintext secrets included, and
//! either activates it or says why it can't. It is the only judge of
//! semantic validity and the only consumer of plaintext.

use crate::core::domain::ResolvedConfig;
use crate::error::ApplyError;

mod deadline;
mod notifier;

pub use deadline::Deadline;
pub use notifier::NotifierCheck;

/// Presents a candidate configuration to the delivery engine.
pub trait Applier: Send + Sync {
    /// Validate and activate `config` for `tenant`.
    ///
    /// # Errors
    ///
    /// Returns `ApplyError` if the engine rejects the configuration or
    /// cannot be reached. Nothing may be persisted after an error.
    fn apply(&self, tenant: &str, config: &ResolvedConfig) -> Result<(), ApplyError>;
}

impl<A: Applier + ?Sized> Applier for std::sync::Arc<A> {
    fn apply(&self, tenant: &str, config: &ResolvedConfig) -> Result<(), ApplyError> {
        (**self).apply(tenant, config)
    }
}
