//! Shared application state injected into every Axum handler.

use crate::crypto::{CipherEngine, KeyManager};

/// Application state shared across all request handlers.
///
/// Holds no key material: [`KeyManager`] hands each request its own key, and
/// [`CipherEngine`] is stateless apart from its entropy source. Both are
/// `Arc`-backed, so Axum can clone the state per request cheaply.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Per-request key generator.
    pub keys: KeyManager,
    /// AES-256-GCM seal/open operations.
    pub engine: CipherEngine,
}

impl AppState {
    /// Create a new [`AppState`] from its components.
    pub fn new(keys: KeyManager, engine: CipherEngine) -> Self {
        Self { keys, engine }
    }
}
