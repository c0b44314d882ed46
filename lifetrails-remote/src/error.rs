//! Remote store error types.

use thiserror::Error;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the remote record store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// 401/403 from the store: the bearer token is wrong or revoked.
    #[error("remote store rejected the credential")]
    InvalidCredential,

    /// Transport-level failure (DNS, connect, timeout).
    #[error("remote store unreachable: {0}")]
    Unreachable(String),

    /// Any other non-success response.
    #[error("remote API error: {0}")]
    Api(String),

    /// A 2xx response whose body did not have the expected shape.
    #[error("malformed remote response: {0}")]
    MalformedResponse(String),
}
