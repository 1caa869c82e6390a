//! Credential codec.
//!
//! Secure fields are encrypted one value at a time with a single
//! process-wide key. The [`Cipher`] trait abstracts the primitive; [`Codec`]
//! adds the storage encoding (base64) and maps every decode or integrity
//! failure onto [`CipherError::Corrupt`].
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Cipher` trait
//! 2. Add the implementation in a new file
//! 3. Re-export from this module

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::trace;
use zeroize::Zeroizing;

use crate::core::types::EncryptedValue;
use crate::error::{CipherError, Result};

mod age;

pub use age::Age;

/// Authenticated symmetric encryption over byte sequences.
///
/// Implementations must be integrity-checked: decrypting tampered
/// ciphertext fails instead of yielding different plaintext.
pub trait Cipher: Send + Sync {
    /// Encrypt a byte sequence (the empty sequence included).
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if encryption fails.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a ciphertext produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Corrupt` if the ciphertext was modified or was
    /// produced under a different key.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Encrypts and decrypts individual secure field values.
pub struct Codec {
    cipher: Box<dyn Cipher>,
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("cipher", &self.cipher.name())
            .finish()
    }
}

impl Codec {
    pub fn new(cipher: impl Cipher + 'static) -> Self {
        Self {
            cipher: Box::new(cipher),
        }
    }

    /// Encrypt raw bytes.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher.encrypt(plaintext)
    }

    /// Decrypt raw bytes.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        self.cipher.decrypt(ciphertext)
    }

    /// Encrypt a secure field value into its stored form.
    pub fn seal(&self, plaintext: &str) -> Result<EncryptedValue> {
        let ciphertext = self.encrypt(plaintext.as_bytes())?;
        trace!(ciphertext_len = ciphertext.len(), "sealed secure field");
        Ok(STANDARD.encode(ciphertext))
    }

    /// Recover a secure field value from its stored form.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Corrupt` if the value is not valid base64,
    /// fails authentication, or is not UTF-8.
    pub fn open(&self, sealed: &str) -> Result<Zeroizing<String>> {
        let ciphertext = STANDARD
            .decode(sealed)
            .map_err(|e| CipherError::Corrupt(format!("invalid encoding: {}", e)))?;
        let plaintext = self.decrypt(&ciphertext)?;
        let text = std::str::from_utf8(&plaintext)
            .map_err(|e| CipherError::Corrupt(format!("UTF-8 error: {}", e)))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}
