//! Alertcfg - Transactional configuration manager for notification routing.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── commands      # keygen, get, set, previous, check
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── config        # alertcfg.toml settings
//!     ├── keys          # Secret key file handling
//!     ├── cipher/       # Credential codec
//!     │   ├── mod       # Cipher trait and Codec
//!     │   └── age       # age encryption implementation
//!     ├── domain/       # Document and integration types
//!     ├── schema        # Notifier registry and structural checks
//!     ├── merge         # Secret intent resolution
//!     ├── applier/      # Delivery engine seam
//!     │   ├── notifier  # Built-in semantic checks
//!     │   └── deadline  # Apply timeout
//!     ├── store/        # Configuration storage
//!     │   ├── fs        # One JSON file per tenant
//!     │   └── memory    # In-process storage
//!     ├── defaults      # Bootstrap document
//!     └── manager       # Get/set orchestration
//! ```
//!
//! # Features
//!
//! - Apply-before-persist: a configuration the delivery engine rejects is
//!   never stored
//! - Receiver credentials encrypted at rest with an age x25519 key
//! - Reads report which credentials are set, never their values
//! - Unchanged credentials carried forward without being resent

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::{ConfigManager, SetOutcome};
pub use crate::error::{Error, Result};
