//! Age encryption backend implementation.
//!
//! A single x25519 identity acts as the symmetric key: its public half is
//! the only recipient, so whoever holds the identity can both seal and open.
//! The age payload is ChaCha20-Poly1305, so any modified byte fails
//! authentication.

use std::io::{Read, Write};

use ::age::secrecy::ExposeSecret;
use ::age::x25519;
use tracing::trace;
use zeroize::Zeroizing;

use super::Cipher;
use crate::error::{CipherError, KeyError, Result};

/// Age-based cipher bound to one identity.
pub struct Age {
    identity: x25519::Identity,
    recipient: x25519::Recipient,
}

impl Age {
    pub fn new(identity: x25519::Identity) -> Self {
        let recipient = identity.to_public();
        Self {
            identity,
            recipient,
        }
    }

    /// Create a cipher with a fresh random identity.
    pub fn generate() -> Self {
        Self::new(x25519::Identity::generate())
    }

    /// Parse an `AGE-SECRET-KEY-1...` string.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidFormat` if the key is malformed.
    pub fn from_secret_key(key: &str) -> Result<Self> {
        let identity: x25519::Identity = key
            .trim()
            .parse()
            .map_err(|e: &str| KeyError::InvalidFormat(e.to_string()))?;
        Ok(Self::new(identity))
    }

    /// Encoded secret key, for writing a key file.
    pub fn secret_key(&self) -> Zeroizing<String> {
        Zeroizing::new(self.identity.to_string().expose_secret().to_string())
    }

    /// Public half of the key.
    pub fn public_key(&self) -> String {
        self.recipient.to_string()
    }
}

impl Cipher for Age {
    fn name(&self) -> &'static str {
        "age"
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let encryptor = age::Encryptor::with_recipients(std::iter::once(
            &self.recipient as &dyn age::Recipient,
        ))
        .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        let mut encrypted = Vec::new();
        let mut writer = encryptor
            .wrap_output(&mut encrypted)
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
        writer
            .write_all(plaintext)
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
        writer
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        trace!(ciphertext_len = encrypted.len(), "encrypted");
        Ok(encrypted)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting");

        let decryptor =
            age::Decryptor::new(ciphertext).map_err(|e| CipherError::Corrupt(format!("{}", e)))?;
        let mut reader = decryptor
            .decrypt(std::iter::once(&self.identity as &dyn age::Identity))
            .map_err(|e| CipherError::Corrupt(format!("{}", e)))?;

        let mut decrypted = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut decrypted)
            .map_err(|e| CipherError::Corrupt(format!("{}", e)))?;

        trace!(plaintext_len = decrypted.len(), "decrypted");
        Ok(decrypted)
    }
}
