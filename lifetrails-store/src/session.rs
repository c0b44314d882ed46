//! Session identity and the session-scoped token cache.

use crate::error::StoreResult;
use chrono::{DateTime, Duration, Utc};
use lifetrails_crypto::AccessToken;
use lifetrails_storage::{ClientStorage, StorageScope};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Absolute session lifetime, measured from sign-in.
pub const SESSION_MAX_AGE_HOURS: i64 = 24;

/// Durable key holding the current signed-in identity (no secrets).
pub const SESSION_IDENTITY_KEY: &str = "session-identity";

/// Session-scope key for a user's unwrapped token.
pub fn session_token_key(username: &str) -> String {
    format!("session-token-{username}")
}

/// Durable key for a user's record blob.
pub fn record_blob_key(user_id: &str) -> String {
    format!("record-blob-{user_id}")
}

/// The public identity of the signed-in user. Persisted durably so a
/// page reload within the session window stays signed in; holds no
/// secret material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: String,
    pub username: String,
    pub name: String,
    pub signed_in_at: DateTime<Utc>,
    /// True for local/plain accounts (no token, no encryption).
    pub is_local: bool,
}

impl SessionIdentity {
    pub fn is_expired(&self) -> bool {
        Utc::now() - self.signed_in_at > Duration::hours(SESSION_MAX_AGE_HOURS)
    }
}

/// Holds the unwrapped token for the lifetime of the session only.
///
/// Backed by the session storage tier, so the token can never outlive
/// the process. Single-threaded access model: last write wins.
#[derive(Clone)]
pub struct SessionKeyCache {
    storage: Arc<ClientStorage>,
}

impl SessionKeyCache {
    pub fn new(storage: Arc<ClientStorage>) -> Self {
        Self { storage }
    }

    pub fn put(&self, username: &str, token: &AccessToken) -> StoreResult<()> {
        self.storage
            .put(StorageScope::Session, &session_token_key(username), token.as_str())?;
        Ok(())
    }

    pub fn get(&self, username: &str) -> StoreResult<Option<AccessToken>> {
        let value = self
            .storage
            .get(StorageScope::Session, &session_token_key(username))?;
        Ok(value.map(AccessToken::new))
    }

    pub fn clear(&self, username: &str) -> StoreResult<()> {
        self.storage
            .remove(StorageScope::Session, &session_token_key(username))?;
        Ok(())
    }
}
