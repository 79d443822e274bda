//! [`KeyManager`]: per-request AES-256 key generation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::cipher::{CipherError, KEY_LEN};
use super::entropy::{EntropySource, OsEntropy};

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Owned by one request for its whole encrypt/decrypt pair. The bytes are
/// zeroed on drop and never printed.
pub struct Key(Box<[u8; KEY_LEN]>);

impl Key {
    /// Raw key bytes, for handing to the cipher.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Short non-reversible identifier for log correlation: the first four
    /// bytes of SHA-256 over the key, hex-encoded.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0[..]);
        hex::encode(&digest[..4])
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0[..].zeroize();
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED])")
    }
}

/// Produces a fresh key on every [`rotate`](KeyManager::rotate).
///
/// There is no "current key" accessor: the returned [`Key`] is the only copy,
/// so two concurrent requests can never observe each other's key.
#[derive(Clone)]
pub struct KeyManager {
    entropy: Arc<dyn EntropySource>,
    rotations: Arc<AtomicU64>,
}

impl KeyManager {
    /// Create a manager drawing key bytes from `entropy`.
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self {
            entropy,
            rotations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Generate a new random key.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::EntropyUnavailable`] if the source cannot fill
    /// all [`KEY_LEN`] bytes. No weaker fallback is attempted.
    pub fn rotate(&self) -> Result<Key, CipherError> {
        let mut buf = Box::new([0u8; KEY_LEN]);
        if let Err(e) = self.entropy.fill(&mut buf[..]) {
            buf[..].zeroize();
            return Err(e.into());
        }
        self.rotations.fetch_add(1, Ordering::Relaxed);
        Ok(Key(buf))
    }

    /// Number of successful rotations since startup.
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Check that the entropy source is currently readable.
    pub fn probe_entropy(&self) -> bool {
        let mut probe = [0u8; 1];
        self.entropy.fill(&mut probe).is_ok()
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("rotations", &self.rotations())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::entropy::{EntropyError, MockEntropySource};

    #[test]
    fn rotate_yields_full_length_key() {
        let key = KeyManager::default().rotate().unwrap();
        assert_eq!(key.as_bytes().len(), KEY_LEN);
    }

    #[test]
    fn successive_rotations_differ() {
        let manager = KeyManager::default();
        let k1 = manager.rotate().unwrap();
        let k2 = manager.rotate().unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
        assert_ne!(k1.fingerprint(), k2.fingerprint());
    }

    #[test]
    fn rotation_counter_tracks_successes_only() {
        let mut entropy = MockEntropySource::new();
        let mut calls = 0;
        entropy.expect_fill().returning(move |dest: &mut [u8]| {
            calls += 1;
            if calls == 2 {
                return Err(EntropyError {
                    reason: "exhausted".into(),
                });
            }
            dest.fill(0xAB);
            Ok(())
        });
        let manager = KeyManager::new(Arc::new(entropy));
        assert!(manager.rotate().is_ok());
        assert!(manager.rotate().is_err());
        assert!(manager.rotate().is_ok());
        assert_eq!(manager.rotations(), 2);
    }

    #[test]
    fn exhausted_entropy_is_reported() {
        let mut entropy = MockEntropySource::new();
        entropy.expect_fill().returning(|_| {
            Err(EntropyError {
                reason: "getrandom failed".into(),
            })
        });
        let manager = KeyManager::new(Arc::new(entropy));
        let err = manager.rotate().unwrap_err();
        assert!(matches!(err, CipherError::EntropyUnavailable(_)));
        assert!(!manager.probe_entropy());
        assert_eq!(manager.rotations(), 0);
    }

    #[test]
    fn fingerprint_is_sha256_prefix() {
        let mut entropy = MockEntropySource::new();
        entropy.expect_fill().returning(|dest: &mut [u8]| {
            dest.fill(0);
            Ok(())
        });
        let key = KeyManager::new(Arc::new(entropy)).rotate().unwrap();
        // SHA-256 of 32 zero bytes begins 66687aad.
        assert_eq!(key.fingerprint(), "66687aad");
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = KeyManager::default().rotate().unwrap();
        assert_eq!(format!("{key:?}"), "Key([REDACTED])");
    }

    #[test]
    fn clones_share_rotation_count() {
        let manager = KeyManager::default();
        let clone = manager.clone();
        clone.rotate().unwrap();
        assert_eq!(manager.rotations(), 1);
        assert!(manager.probe_entropy());
    }
}
