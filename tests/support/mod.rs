//! Test support utilities for alertcfg integration tests.
//!
//! Provides an isolated CLI environment, in-process manager setups with
//! test doubles, and shared fixtures.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod doubles;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use doubles::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::sync::Arc;

use alertcfg::core::applier::Applier;
use alertcfg::core::cipher::{Age, Codec};
use alertcfg::core::defaults::BuiltinDefault;
use alertcfg::core::store::{MemoryStore, Store};
use alertcfg::ConfigManager;
use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Child processes use `.current_dir()`, so the default `alertcfg.toml`,
/// store and key paths all land inside the temp dir and tests can run in
/// parallel.
pub struct Test {
    /// Temporary working directory for the CLI
    pub dir: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment with a secret key generated.
    pub fn init() -> Self {
        let t = Self::new();
        let output = t.keygen();
        assert!(
            output.status.success(),
            "Failed to generate key: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Write a file inside the test directory and return its name.
    pub fn write(&self, name: &str, contents: &str) -> String {
        std::fs::write(self.dir.path().join(name), contents).expect("failed to write file");
        name.to_string()
    }
}

/// A manager over an in-memory store, with direct access to both ends.
pub struct Harness<A> {
    pub manager: ConfigManager,
    pub store: Arc<MemoryStore>,
    pub applier: Arc<A>,
}

impl<A: Applier + 'static> Harness<A> {
    /// Manager with the built-in default document attached.
    pub fn new(applier: A) -> Self {
        let store = Arc::new(MemoryStore::new());
        let applier = Arc::new(applier);
        let manager = ConfigManager::new(
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::clone(&applier) as Arc<dyn Applier>,
            Codec::new(Age::generate()),
        )
        .with_defaults(BuiltinDefault);
        Self {
            manager,
            store,
            applier,
        }
    }

    /// Stored (encrypted) document for a tenant.
    pub fn stored(&self, tenant: &str) -> Option<alertcfg::core::domain::StoredConfig> {
        self.store.load(tenant).expect("memory store load failed")
    }
}
