//! AES-256-GCM request sealing primitives.
//!
//! This module is intentionally free of HTTP dependencies. It provides the
//! key generation and encrypt/decrypt operations used by the round-trip
//! workflow.
//!
//! # Ciphertext layout
//!
//! ```text
//! <ciphertext (len = plaintext)><tag (16 bytes)>
//! ```
//!
//! The 12-byte nonce travels beside the ciphertext, never inside it.

pub mod cipher;
pub mod entropy;
pub mod key;

pub use cipher::{CipherEngine, CipherError};
pub use entropy::OsEntropy;
pub use key::KeyManager;
