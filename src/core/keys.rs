//! Secret key management.
//!
//! The process-wide key is an age identity stored in a key file with
//! restricted permissions, or passed in through `ALERTCFG_SECRET_KEY`.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::cipher::Age;
use crate::core::constants;
use crate::error::{KeyError, Result};

/// Check that a file has the expected permissions mode (Unix only).
#[cfg(unix)]
fn has_mode(path: &Path, expected_mode: u32) -> std::io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)?;
    Ok(metadata.permissions().mode() & 0o777 == expected_mode)
}

/// Generate a new key file.
///
/// Creates the parent directory if needed and writes the key with mode
/// 0600 on Unix.
///
/// # Returns
///
/// The public half of the new key.
///
/// # Errors
///
/// Returns `KeyError::AlreadyExists` if the file exists, or
/// `KeyError::WriteFailed` if it cannot be written.
pub fn generate(path: &Path) -> Result<String> {
    if path.exists() {
        return Err(KeyError::AlreadyExists(path.display().to_string()).into());
    }

    let cipher = Age::generate();

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(KeyError::WriteFailed)?;
        }
    }
    fs::write(path, format!("{}\n", cipher.secret_key().as_str())).map_err(KeyError::WriteFailed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(KeyError::WriteFailed)?;
    }

    debug!(path = %path.display(), "generated secret key");
    Ok(cipher.public_key())
}

/// Load the key from a file.
///
/// # Errors
///
/// Returns `KeyError::NoKey` if the file doesn't exist, or
/// `KeyError::InvalidFormat` if it is malformed.
pub fn load_file(path: &Path) -> Result<Age> {
    if !path.exists() {
        return Err(KeyError::NoKey(path.display().to_string()).into());
    }

    #[cfg(unix)]
    {
        if let Ok(false) = has_mode(path, 0o600) {
            warn!(path = %path.display(), "secret key file is readable by others; run chmod 600");
        }
    }

    let contents = zeroize::Zeroizing::new(fs::read_to_string(path).map_err(KeyError::ReadFailed)?);
    Age::from_secret_key(&contents)
}

/// Load the key, preferring the environment over the key file.
pub fn load(path: &Path) -> Result<Age> {
    match std::env::var(constants::KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => {
            debug!("using secret key from environment");
            Age::from_secret_key(&zeroize::Zeroizing::new(key))
        }
        _ => load_file(path),
    }
}
