//! The per-request seal-and-verify sequence.
//!
//! ```text
//! Idle -> KeyRotated -> Encrypted -> Verified(success | failure) -> Idle
//! ```
//!
//! The key is owned by [`seal_and_verify`] for the whole sequence and is
//! dropped (zeroed) before control returns, so concurrent requests never share
//! or overwrite each other's key.
//!
//! Raw key bytes and plaintext are never logged. Key identity is logged as a
//! SHA-256 fingerprint.

use common::ServiceError;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::crypto::{CipherEngine, CipherError, KeyManager};

/// Progress of one request through the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    KeyRotated,
    Encrypted,
    Verified,
}

/// Why a round trip ended in `Verified(failure)`.
#[derive(Debug, Error)]
pub enum RoundTripError {
    /// A cipher-layer error stopped the sequence; `stage` is the last stage
    /// completed before it.
    #[error("{source} (last completed stage: {stage:?})")]
    Cipher {
        stage: Stage,
        #[source]
        source: CipherError,
    },

    /// Decryption verified the tag but returned different bytes.
    #[error("decrypted plaintext does not match the submitted plaintext")]
    Mismatch,
}

impl RoundTripError {
    fn at(stage: Stage) -> impl FnOnce(CipherError) -> Self {
        move |source| RoundTripError::Cipher { stage, source }
    }
}

impl From<RoundTripError> for ServiceError {
    fn from(err: RoundTripError) -> Self {
        match err {
            RoundTripError::Cipher {
                source: CipherError::EntropyUnavailable(e),
                ..
            } => ServiceError::EntropyUnavailable(e.to_string()),
            RoundTripError::Cipher {
                source: CipherError::AuthenticationFailed,
                ..
            } => ServiceError::VerificationFailed("authentication failed".into()),
            RoundTripError::Cipher { source, .. } => {
                ServiceError::EncryptionFailure(source.to_string())
            }
            RoundTripError::Mismatch => {
                ServiceError::VerificationFailed("recovered plaintext differs".into())
            }
        }
    }
}

/// Summary of a successful round trip. Contains no key or plaintext bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    pub key_fingerprint: String,
    pub plaintext_len: usize,
    pub ciphertext_len: usize,
}

/// Rotate a key, seal `plaintext`, open it again and check the result.
///
/// # Errors
///
/// Returns [`RoundTripError::Cipher`] if any cipher step fails and
/// [`RoundTripError::Mismatch`] if the opened bytes differ from `plaintext`.
pub fn seal_and_verify(
    keys: &KeyManager,
    engine: &CipherEngine,
    plaintext: &[u8],
) -> Result<RoundTripReport, RoundTripError> {
    let key = keys.rotate().map_err(RoundTripError::at(Stage::Idle))?;
    let key_fingerprint = key.fingerprint();
    info!(key_fingerprint = %key_fingerprint, "key rotated");

    let sealed = engine
        .encrypt(key.as_bytes(), plaintext)
        .map_err(RoundTripError::at(Stage::KeyRotated))?;
    info!(
        plaintext_len = plaintext.len(),
        ciphertext_len = sealed.ciphertext.len(),
        "plaintext encrypted"
    );
    debug!(
        nonce = %hex::encode(sealed.nonce),
        ciphertext = %hex::encode(&sealed.ciphertext),
        "sealed output"
    );

    let opened = engine
        .decrypt(key.as_bytes(), &sealed.nonce, &sealed.ciphertext)
        .map_err(RoundTripError::at(Stage::Encrypted))?;
    drop(key);
    info!(recovered_len = opened.len(), "ciphertext decrypted");

    if opened != plaintext {
        warn!("round trip failed: recovered plaintext differs");
        return Err(RoundTripError::Mismatch);
    }

    info!(stage = ?Stage::Verified, "round trip verified");
    Ok(RoundTripReport {
        key_fingerprint,
        plaintext_len: plaintext.len(),
        ciphertext_len: sealed.ciphertext.len(),
    })
}
