//! Shared CLI output helpers.
//!
//! Status lines go to stderr so stdout stays machine-readable JSON.
//! Colors respect NO_COLOR and are dropped when stderr is not a terminal.

use console::style;
use serde::Serialize;

use crate::error::{Error, Result};

fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ configuration is valid`
pub fn success(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✓").green().for_stderr(), msg);
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red().for_stderr(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ run: alertcfg keygen`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!(
            "{} {}",
            style("→").cyan().for_stderr(),
            style(msg).cyan().for_stderr()
        );
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a value as pretty JSON on stderr.
pub fn json_err<T: Serialize>(value: &T) -> Result<()> {
    eprintln!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Suggested next step for an error, if there is an obvious one.
pub fn suggestion(err: &Error) -> Option<&'static str> {
    use crate::error::KeyError;

    match err {
        Error::Key(KeyError::AlreadyExists(_)) => {
            Some("remove the existing key file first; stored credentials become unreadable")
        }
        Error::NotFound(_) => Some("run: alertcfg set <file>"),
        Error::Conflict(_) => Some("another update is in flight; retry"),
        Error::NotPersisted { .. } => {
            Some("the delivery engine is running a configuration the store lacks; retry the set")
        }
        _ => None,
    }
}
