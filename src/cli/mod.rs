//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Alertcfg - Transactional configuration manager for notification routing.
#[derive(Parser)]
#[command(
    name = "alertcfg",
    about = "Transactional configuration manager for notification routing",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file
    #[arg(
        long,
        global = true,
        env = "ALERTCFG_SETTINGS",
        default_value = crate::core::constants::SETTINGS_FILE
    )]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate the secret key used to encrypt receiver credentials
    Keygen,

    /// Show the current configuration with credentials redacted
    Get {
        /// Tenant id (defaults to settings)
        #[arg(short, long)]
        tenant: Option<String>,
    },

    /// Apply and save a configuration document
    Set {
        /// JSON document, or `-` for stdin
        file: String,
        /// Tenant id (defaults to settings)
        #[arg(short, long)]
        tenant: Option<String>,
    },

    /// Show the configuration the current one replaced
    Previous {
        /// Tenant id (defaults to settings)
        #[arg(short, long)]
        tenant: Option<String>,
    },

    /// Validate a document without applying or saving it
    Check {
        /// JSON document, or `-` for stdin
        file: String,
        /// Tenant id (defaults to settings)
        #[arg(short, long)]
        tenant: Option<String>,
    },
}
