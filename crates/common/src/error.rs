//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::EntropyUnavailable`] → 503
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::VerificationFailed`] → 500
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::PayloadTooLarge`] → 413
/// - [`ServiceError::NotFound`] → 404
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The system random source could not supply key or nonce bytes.
    #[error("entropy unavailable: {0}")]
    EntropyUnavailable(String),

    /// Encryption failed for a reason other than entropy (e.g. key length).
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The self-check decryption did not reproduce the submitted plaintext.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// No route matches the requested path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body could not be read as a `plaintext` form.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body exceeds the configured size cap.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::EntropyUnavailable(_) => 503,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::VerificationFailed(_) => 500,
            ServiceError::BadRequest(_) => 400,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::NotFound(_) => 404,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::EntropyUnavailable(_) => "entropy_unavailable",
            ServiceError::EncryptionFailure(_) => "encryption_failed",
            ServiceError::VerificationFailed(_) => "verification_failed",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::PayloadTooLarge(_) => "payload_too_large",
            ServiceError::NotFound(_) => "not_found",
        }
    }
}
