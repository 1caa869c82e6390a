//! Command implementations.
//!
//! Handler functions for each CLI command.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::cli::{output, Command};
use crate::core::applier::NotifierCheck;
use crate::core::config::Settings;
use crate::core::domain::{GettableConfig, PostableConfig};
use crate::core::keys;
use crate::error::Result;

/// Execute a command.
///
/// # Arguments
///
/// * `command` - Parsed command from CLI
/// * `settings_path` - Path to `alertcfg.toml`
///
/// # Errors
///
/// Returns error if the command execution fails.
pub fn execute(command: Command, settings_path: &Path) -> Result<()> {
    let settings = Settings::load(settings_path)?;

    match command {
        Command::Keygen => cmd_keygen(&settings),
        Command::Get { tenant } => cmd_get(&settings, tenant),
        Command::Set { file, tenant } => cmd_set(&settings, &file, tenant),
        Command::Previous { tenant } => cmd_previous(&settings, tenant),
        Command::Check { file, tenant } => cmd_check(&settings, &file, tenant),
    }
}

fn tenant_or_default(settings: &Settings, tenant: Option<String>) -> String {
    tenant.unwrap_or_else(|| settings.defaults.tenant.clone())
}

/// Read a JSON document from a file, or stdin for `-`.
fn read_document(file: &str) -> Result<PostableConfig> {
    let contents = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    debug!(source = file, bytes = contents.len(), "read document");
    Ok(serde_json::from_str(&contents)?)
}

/// Generate the secret key file.
fn cmd_keygen(settings: &Settings) -> Result<()> {
    let public_key = keys::generate(&settings.keys.file)?;
    output::success(&format!("secret key written to {}", settings.keys.file.display()));
    println!("{}", public_key);
    Ok(())
}

/// Print the redacted current configuration.
fn cmd_get(settings: &Settings, tenant: Option<String>) -> Result<()> {
    let tenant = tenant_or_default(settings, tenant);
    let result = settings
        .open_manager()
        .and_then(|manager| manager.get(&tenant));
    print_read(result)
}

/// Apply and save a document.
///
/// Failures print the `{error, message}` payload on stderr.
fn cmd_set(settings: &Settings, file: &str, tenant: Option<String>) -> Result<()> {
    let tenant = tenant_or_default(settings, tenant);

    let result = read_document(file).and_then(|document| {
        let manager = settings.open_manager()?;
        manager.set(&tenant, document)
    });

    match result {
        Ok(outcome) => output::json(&outcome.response()),
        Err(e) => {
            output::json_err(&e.response())?;
            Err(e)
        }
    }
}

/// Print the redacted previous configuration.
fn cmd_previous(settings: &Settings, tenant: Option<String>) -> Result<()> {
    let tenant = tenant_or_default(settings, tenant);
    let result = settings
        .open_manager()
        .and_then(|manager| manager.previous(&tenant));
    print_read(result)
}

/// Print a read result, or its `{error, message}` payload on stderr.
fn print_read(result: Result<GettableConfig>) -> Result<()> {
    match result {
        Ok(config) => output::json(&config),
        Err(e) => {
            output::json_err(&e.read_response())?;
            Err(e)
        }
    }
}

/// Run the set pipeline up to, but not including, activation.
fn cmd_check(settings: &Settings, file: &str, tenant: Option<String>) -> Result<()> {
    let tenant = tenant_or_default(settings, tenant);
    let document = read_document(file)?;
    let manager = settings.open_manager()?;
    manager.check(&tenant, document, &NotifierCheck)?;
    output::success("configuration is valid");
    Ok(())
}
