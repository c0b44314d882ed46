//! Record store error types.

use lifetrails_crypto::CryptoError;
use lifetrails_remote::RemoteError;
use lifetrails_storage::StorageError;
use lifetrails_types::RecordError;
use thiserror::Error;

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Username absent from the account directory.
    #[error("unknown account: {0}")]
    UnknownAccount(String),

    /// Wrong password, wrong token, or corrupted credential material;
    /// never distinguished further.
    #[error("invalid username or password")]
    InvalidCredential,

    /// The 24-hour session window has elapsed.
    #[error("session expired, sign in again")]
    SessionExpired,

    #[error("not signed in")]
    NotSignedIn,

    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// Remote-style usernames are provisioned through the directory,
    /// never via local sign-up.
    #[error("username {0:?} is reserved for remote accounts")]
    ReservedUsername(String),

    /// The signed-in account is local/plain and has no remote credential.
    #[error("account has no remote credential")]
    NoRemoteCredential,

    #[error("remote store unreachable: {0}")]
    Unreachable(String),

    #[error("remote error: {0}")]
    Remote(RemoteError),

    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Credential-class and reachability failures get their own variants so
// callers never have to pattern-match through the wrapped layers.

impl From<CryptoError> for StoreError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidCredential => StoreError::InvalidCredential,
            other => StoreError::Crypto(other),
        }
    }
}

impl From<RemoteError> for StoreError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::InvalidCredential => StoreError::InvalidCredential,
            RemoteError::Unreachable(reason) => StoreError::Unreachable(reason),
            other => StoreError::Remote(other),
        }
    }
}
