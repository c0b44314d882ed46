//! The account directory: who can sign in, and how.
//!
//! Loaded once from a JSON configuration document and cached for the
//! store's lifetime. Remote accounts are provisioned out-of-band by
//! whoever manages the document; local accounts can be created through
//! sign-up.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Username prefix reserved for directory-provisioned remote accounts.
const REMOTE_USERNAME_PREFIX: &str = "lt_";

/// A local/plain account: password checked by direct comparison, record
/// stored unencrypted. Exists for accounts with no remote credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAccount {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub place_of_birth: String,
}

/// How a given username authenticates, decided by directory metadata.
#[derive(Clone, Debug)]
pub enum AccountKind {
    /// Password unwraps this secret artifact into the remote-store token.
    RemoteEncrypted { artifact: String },
    /// Trust-reduced path: plain password comparison, plain storage.
    LocalPlain(LocalAccount),
}

/// The configuration document mapping usernames to credentials.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDirectory {
    /// username -> base64 secret artifact.
    #[serde(default)]
    encrypted_secrets: BTreeMap<String, String>,

    #[serde(default)]
    local_accounts: Vec<LocalAccount>,
}

impl AccountDirectory {
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Storage(lifetrails_storage::StorageError::Io(e)))?;
        Self::from_json(&raw)
    }

    /// Registers a remote account's artifact (provisioning side).
    pub fn insert_artifact(&mut self, username: impl Into<String>, artifact: impl Into<String>) {
        self.encrypted_secrets.insert(username.into(), artifact.into());
    }

    /// Adds a local account via sign-up. Remote-style usernames and
    /// duplicates (in either table) are rejected.
    pub fn add_local_account(&mut self, account: LocalAccount) -> StoreResult<()> {
        if account.username.starts_with(REMOTE_USERNAME_PREFIX) {
            return Err(StoreError::ReservedUsername(account.username));
        }
        if self.lookup(&account.username).is_some() {
            return Err(StoreError::DuplicateUsername(account.username));
        }
        self.local_accounts.push(account);
        Ok(())
    }

    /// Resolves a username to its authentication strategy. The artifact
    /// table wins if a username somehow appears in both.
    pub fn lookup(&self, username: &str) -> Option<AccountKind> {
        if let Some(artifact) = self.encrypted_secrets.get(username) {
            return Some(AccountKind::RemoteEncrypted {
                artifact: artifact.clone(),
            });
        }
        self.local_accounts
            .iter()
            .find(|a| a.username == username)
            .map(|a| AccountKind::LocalPlain(a.clone()))
    }
}
