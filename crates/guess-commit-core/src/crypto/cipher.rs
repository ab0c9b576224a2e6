//! Symmetric sealing of commitment payloads with ChaCha20-Poly1305.
//!
//! sealed = nonce (12 bytes) || ciphertext || tag (16 bytes)
//!
//! The key is generated once per cipher instance and never leaves it.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use std::fmt;
use thiserror::Error;

const NONCE_LEN: usize = 12;

/// Cipher errors
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("sealed payload too short: {0} bytes")]
    Truncated(usize),

    #[error("decryption failed - wrong key or tampered ciphertext")]
    DecryptionFailed,
}

/// Nonce-prefixed AEAD output
#[derive(Clone, PartialEq, Eq)]
pub struct SealedPayload(Vec<u8>);

impl SealedPayload {
    /// Wrap raw sealed bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SealedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealedPayload({} bytes)", self.0.len())
    }
}

/// Holds a private random key
pub struct SecretCipher {
    cipher: ChaCha20Poly1305,
}

impl SecretCipher {
    /// Create a cipher with a fresh random key
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
        }
    }

    /// Encrypt under a fresh random nonce
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedPayload, CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(SealedPayload(sealed))
    }

    /// Decrypt and authenticate a sealed payload
    pub fn open(&self, sealed: &SealedPayload) -> Result<Vec<u8>, CipherError> {
        if sealed.len() < NONCE_LEN {
            return Err(CipherError::Truncated(sealed.len()));
        }
        let (nonce, ciphertext) = sealed.as_bytes().split_at(NONCE_LEN);

        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::DecryptionFailed)
    }
}

impl fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCipher(<redacted>)")
    }
}
