//! Source of cryptographically secure random bytes for keys and nonces.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use thiserror::Error;

/// The random source could not supply the requested bytes.
#[derive(Debug, Error)]
#[error("entropy source unavailable: {reason}")]
pub struct EntropyError {
    /// Description from the underlying source. Never contains random output.
    pub reason: String,
}

/// Fills buffers with cryptographically secure random bytes.
///
/// Implementations must either fill `dest` completely or return an error.
/// Falling back to a weaker generator is not permitted.
#[cfg_attr(test, mockall::automock)]
pub trait EntropySource: Send + Sync {
    /// Fill every byte of `dest`.
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// The operating system CSPRNG (`getrandom`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        OsRng.try_fill_bytes(dest).map_err(|e| EntropyError {
            reason: e.to_string(),
        })
    }
}
