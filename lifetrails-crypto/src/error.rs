//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in the confidentiality layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Malformed call parameters. Programmer error, never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The secret artifact is not decodable into `salt || iv || ciphertext`.
    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),

    /// Authenticated decryption of the secret artifact failed. Wrong
    /// password and corrupted artifact are deliberately indistinguishable;
    /// callers must treat both identically to avoid a guessing oracle.
    #[error("invalid credential")]
    InvalidCredential,

    /// The artifact decrypted to an empty (or whitespace-only) token.
    #[error("unwrapped token is empty")]
    EmptyToken,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authenticated decryption of a record blob failed, or the decrypted
    /// payload did not parse as a record.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}
