//! Core library components.
//!
//! This module contains the reusable logic for validating, merging,
//! encrypting, applying and persisting notification configurations.

pub mod applier;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod defaults;
pub mod domain;
pub mod keys;
pub mod manager;
pub mod merge;
pub mod schema;
pub mod store;
pub mod types;

pub use manager::{ConfigManager, SetOutcome, SuccessResponse};
