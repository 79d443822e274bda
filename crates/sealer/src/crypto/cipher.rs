//! AES-256-GCM sealing and opening of request plaintexts.
//!
//! **Nonce rule:** every [`CipherEngine::encrypt`] call draws a fresh 96-bit
//! nonce from the entropy source, and every request runs under a freshly
//! rotated key. A (key, nonce) pair therefore seals exactly one plaintext.
//! Never pass a caller-chosen nonce into the sealing path.

use std::fmt;
use std::sync::Arc;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use thiserror::Error;

use super::entropy::{EntropyError, EntropySource, OsEntropy};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Raw nonce bytes.
pub type NonceBytes = [u8; NONCE_LEN];

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The random source could not supply key or nonce bytes.
    #[error(transparent)]
    EntropyUnavailable(#[from] EntropyError),

    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    CipherInit { expected: usize, actual: usize },

    /// The tag did not verify: wrong key, wrong nonce, or tampered ciphertext.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// AES-GCM refused to seal the message (plaintext above the mode's limit).
    #[error("aead seal failed")]
    SealFailure,
}

/// Output of [`CipherEngine::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Ciphertext with the [`TAG_LEN`]-byte tag as suffix.
    pub ciphertext: Vec<u8>,
    /// Nonce the ciphertext was sealed under.
    pub nonce: NonceBytes,
}

/// Authenticated encryption and decryption with AES-256-GCM.
///
/// Holds no key material. Cloning is cheap; the entropy source is shared.
#[derive(Clone)]
pub struct CipherEngine {
    entropy: Arc<dyn EntropySource>,
}

impl CipherEngine {
    /// Create an engine drawing nonces from `entropy`.
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    /// Seal `plaintext` under `key` with a fresh nonce and no associated data.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::CipherInit`] if `key` is not [`KEY_LEN`] bytes,
    /// [`CipherError::EntropyUnavailable`] if no nonce can be drawn.
    pub fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Sealed, CipherError> {
        let cipher = build_cipher(key)?;

        let mut nonce = [0u8; NONCE_LEN];
        self.entropy.fill(&mut nonce)?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CipherError::SealFailure)?;

        Ok(Sealed { ciphertext, nonce })
    }

    /// Open `ciphertext` under `key` and `nonce` with no associated data.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::CipherInit`] if `key` is not [`KEY_LEN`] bytes,
    /// [`CipherError::AuthenticationFailed`] if the tag does not verify or
    /// `ciphertext` is shorter than [`TAG_LEN`].
    pub fn decrypt(
        &self,
        key: &[u8],
        nonce: &NonceBytes,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let cipher = build_cipher(key)?;
        if ciphertext.len() < TAG_LEN {
            return Err(CipherError::AuthenticationFailed);
        }
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::AuthenticationFailed)
    }
}

impl Default for CipherEngine {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl fmt::Debug for CipherEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEngine").finish_non_exhaustive()
    }
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    let invalid = || CipherError::CipherInit {
        expected: KEY_LEN,
        actual: key.len(),
    };
    if key.len() != KEY_LEN {
        return Err(invalid());
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| invalid())
}
