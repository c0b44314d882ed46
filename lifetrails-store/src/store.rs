//! Sign-in/sign-out state machine and encrypted record persistence.

use crate::accounts::{AccountDirectory, AccountKind, LocalAccount};
use crate::error::{StoreError, StoreResult};
use crate::session::{
    record_blob_key, SessionIdentity, SessionKeyCache, SESSION_IDENTITY_KEY,
};
use chrono::Utc;
use lifetrails_crypto::{decrypt_record, encrypt_record, unwrap_token, AccessToken};
use lifetrails_remote::RecordApiClient;
use lifetrails_storage::{ClientStorage, StorageScope};
use lifetrails_types::{FamilyMember, LifeEvent, UserRecord};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Orchestrates authentication, the session token cache, and the
/// encrypted local record.
///
/// One sign-in at a time: `SignedOut -> Authenticating -> SignedIn`,
/// back to `SignedOut` on failure, explicit sign-out, or 24-hour expiry.
/// Constructed at startup with its storage and directory; there is no
/// ambient global state.
pub struct RecordStore {
    storage: Arc<ClientStorage>,
    remote: Arc<RecordApiClient>,
    directory: RwLock<AccountDirectory>,
    session_cache: SessionKeyCache,
    /// Serializes read-modify-write mutation sequences. The UI's
    /// one-gesture-at-a-time model makes races unlikely, but concurrent
    /// triggers would otherwise lose the first of two updates.
    mutation_lock: tokio::sync::Mutex<()>,
}

impl RecordStore {
    pub fn new(
        directory: AccountDirectory,
        storage: Arc<ClientStorage>,
        remote: Arc<RecordApiClient>,
    ) -> Self {
        let session_cache = SessionKeyCache::new(storage.clone());
        Self {
            storage,
            remote,
            directory: RwLock::new(directory),
            session_cache,
            mutation_lock: tokio::sync::Mutex::new(()),
        }
    }

    // ── Sessions ──

    /// Returns the current identity, opportunistically enforcing the
    /// 24-hour expiry: an expired session clears the cached token and
    /// identity (the encrypted blob stays until the next successful
    /// sign-in supersedes it) and reports `SessionExpired`.
    pub fn current_session(&self) -> StoreResult<Option<SessionIdentity>> {
        let Some(raw) = self.storage.get(StorageScope::Durable, SESSION_IDENTITY_KEY)? else {
            return Ok(None);
        };
        let identity: SessionIdentity = serde_json::from_str(&raw)?;

        if identity.is_expired() {
            debug!(username = %identity.username, "session expired");
            self.session_cache.clear(&identity.username)?;
            self.storage.remove(StorageScope::Durable, SESSION_IDENTITY_KEY)?;
            return Err(StoreError::SessionExpired);
        }
        Ok(Some(identity))
    }

    /// Signs in, selecting the authentication strategy from account
    /// metadata.
    pub async fn sign_in(&self, username: &str, password: &str) -> StoreResult<SessionIdentity> {
        let kind = self
            .directory
            .read()
            .map_err(|_| StoreError::Storage(lifetrails_storage::StorageError::Poisoned))?
            .lookup(username)
            .ok_or_else(|| StoreError::UnknownAccount(username.to_string()))?;

        match kind {
            AccountKind::LocalPlain(account) => self.sign_in_local(&account, password),
            AccountKind::RemoteEncrypted { artifact } => {
                self.sign_in_remote(username, password, &artifact).await
            }
        }
    }

    /// Creates a local account and signs it in. Remote accounts are
    /// provisioned through the account directory instead.
    pub async fn sign_up(&self, account: LocalAccount) -> StoreResult<SessionIdentity> {
        let password = account.password.clone();
        let username = account.username.clone();
        self.directory
            .write()
            .map_err(|_| StoreError::Storage(lifetrails_storage::StorageError::Poisoned))?
            .add_local_account(account)?;
        self.sign_in(&username, &password).await
    }

    /// Explicit sign-out: clears the cached token, deletes the durable
    /// record blob, and drops the identity marker.
    pub fn sign_out(&self) -> StoreResult<()> {
        if let Some(raw) = self.storage.get(StorageScope::Durable, SESSION_IDENTITY_KEY)? {
            if let Ok(identity) = serde_json::from_str::<SessionIdentity>(&raw) {
                self.session_cache.clear(&identity.username)?;
                self.storage
                    .remove(StorageScope::Durable, &record_blob_key(&identity.user_id))?;
                debug!(username = %identity.username, "signed out");
            }
        }
        self.storage.remove(StorageScope::Durable, SESSION_IDENTITY_KEY)?;
        Ok(())
    }

    // ── Record access ──

    /// Loads the signed-in user's record from local storage.
    ///
    /// For encrypted accounts a missing session token makes the blob
    /// unreadable; policy is to discard it and require re-authentication
    /// rather than attempt recovery.
    pub async fn load_record(&self) -> StoreResult<UserRecord> {
        let identity = self.current_session()?.ok_or(StoreError::NotSignedIn)?;
        self.load_record_for(&identity)
    }

    pub async fn add_event(&self, event: LifeEvent) -> StoreResult<()> {
        let _guard = self.mutation_lock.lock().await;
        self.mutate(|record| record.add_event(event).map_err(StoreError::from))
            .await
    }

    pub async fn delete_event(&self, year: &str, index: usize) -> StoreResult<()> {
        let _guard = self.mutation_lock.lock().await;
        self.mutate(|record| {
            record.delete_event(year, index)?;
            Ok(())
        })
        .await
    }

    pub async fn add_family_member(&self, member: FamilyMember) -> StoreResult<()> {
        let _guard = self.mutation_lock.lock().await;
        self.mutate(|record| {
            record.add_family_member(member);
            Ok(())
        })
        .await
    }

    pub async fn delete_family_member(&self, index: usize) -> StoreResult<()> {
        let _guard = self.mutation_lock.lock().await;
        self.mutate(|record| {
            record.delete_family_member(index)?;
            Ok(())
        })
        .await
    }

    /// Pushes the current record to the remote store with optimistic
    /// concurrency. The local encrypted copy stays authoritative; a
    /// failure here is reported, not retried.
    pub async fn sync_remote(&self) -> StoreResult<String> {
        let identity = self.current_session()?.ok_or(StoreError::NotSignedIn)?;
        if identity.is_local {
            return Err(StoreError::NoRemoteCredential);
        }
        let token = self
            .session_cache
            .get(&identity.username)?
            .ok_or(StoreError::NotSignedIn)?;

        let record = self.load_record_for(&identity)?;
        let content = serde_json::to_string_pretty(&record)?;

        // Refetch for the current version tag; the sha is deliberately
        // not persisted across restarts.
        let prior_sha = self
            .remote
            .fetch_record(&identity.user_id, &token)
            .await?
            .map(|file| file.sha);

        let sha = self
            .remote
            .put_record(&identity.user_id, &token, &content, prior_sha.as_deref())
            .await?;
        Ok(sha)
    }

    // ── Sign-in paths ──

    /// Trust-reduced path for accounts with no remote credential:
    /// direct password comparison, plain-JSON storage, no token.
    fn sign_in_local(
        &self,
        account: &LocalAccount,
        password: &str,
    ) -> StoreResult<SessionIdentity> {
        if account.password != password {
            return Err(StoreError::InvalidCredential);
        }

        let blob_key = record_blob_key(&account.username);
        if self.storage.get(StorageScope::Durable, &blob_key)?.is_none() {
            let mut record = UserRecord::empty(&account.username);
            record.name = account.name.clone();
            record.date_of_birth = account.date_of_birth.clone();
            record.place_of_birth = account.place_of_birth.clone();
            self.storage
                .put(StorageScope::Durable, &blob_key, &serde_json::to_string(&record)?)?;
        }

        let identity = SessionIdentity {
            user_id: account.username.clone(),
            username: account.username.clone(),
            name: account.name.clone(),
            signed_in_at: Utc::now(),
            is_local: true,
        };
        self.persist_identity(&identity)?;
        debug!(username = %identity.username, "local sign-in");
        Ok(identity)
    }

    async fn sign_in_remote(
        &self,
        username: &str,
        password: &str,
        artifact: &str,
    ) -> StoreResult<SessionIdentity> {
        // Wrong password and corrupted artifact are the same error here;
        // surface both as the user-facing invalid-credential failure.
        let token = unwrap_token(artifact, password)?;
        self.session_cache.put(username, &token)?;

        let record = match self.remote.fetch_record(username, &token).await {
            Ok(Some(file)) => {
                let mut record: UserRecord = serde_json::from_str(&file.content)
                    .map_err(StoreError::Serialization)?;
                if record.id.is_empty() {
                    record.id = username.to_string();
                }
                record
            }
            // Not found: a new user with no data yet.
            Ok(None) => UserRecord::empty(username),
            Err(e @ lifetrails_remote::RemoteError::Unreachable(_)) => {
                // Offline sign-in: acceptable only when a previously
                // stored blob opens under this token, proving the
                // credential without the remote.
                match self.offline_record(username, &token)? {
                    Some(record) => {
                        warn!(username, "remote unreachable, signing in from local record");
                        record
                    }
                    None => {
                        self.session_cache.clear(username)?;
                        return Err(e.into());
                    }
                }
            }
            Err(e) => {
                // Keep the token cache clean on an aborted sign-in.
                self.session_cache.clear(username)?;
                return Err(e.into());
            }
        };

        // Local persistence must never block a successful sign-in:
        // degrade to plain storage if encryption fails.
        let blob_key = record_blob_key(username);
        match encrypt_record(&record, &token) {
            Ok(blob) => self.storage.put(StorageScope::Durable, &blob_key, &blob)?,
            Err(e) => {
                warn!(username, "record encryption failed at sign-in, storing plain: {e}");
                self.storage
                    .put(StorageScope::Durable, &blob_key, &serde_json::to_string(&record)?)?;
            }
        }

        let identity = SessionIdentity {
            user_id: username.to_string(),
            username: username.to_string(),
            name: record.name.clone(),
            signed_in_at: Utc::now(),
            is_local: false,
        };
        self.persist_identity(&identity)?;
        debug!(username, "remote sign-in");
        Ok(identity)
    }

    // ── Internals ──

    fn offline_record(&self, username: &str, token: &AccessToken) -> StoreResult<Option<UserRecord>> {
        let Some(blob) = self
            .storage
            .get(StorageScope::Durable, &record_blob_key(username))?
        else {
            return Ok(None);
        };
        Ok(decrypt_record(&blob, token).ok())
    }

    fn persist_identity(&self, identity: &SessionIdentity) -> StoreResult<()> {
        self.storage.put(
            StorageScope::Durable,
            SESSION_IDENTITY_KEY,
            &serde_json::to_string(identity)?,
        )?;
        Ok(())
    }

    fn load_record_for(&self, identity: &SessionIdentity) -> StoreResult<UserRecord> {
        let blob_key = record_blob_key(&identity.user_id);
        let Some(stored) = self.storage.get(StorageScope::Durable, &blob_key)? else {
            return Ok(UserRecord::empty(&identity.user_id));
        };

        if identity.is_local {
            return Ok(serde_json::from_str(&stored)?);
        }

        let Some(token) = self.session_cache.get(&identity.username)? else {
            // Session cache gone without a sign-out (e.g. restart): the
            // blob is unreadable. Discard it, require re-authentication.
            warn!(username = %identity.username, "session token missing, discarding encrypted blob");
            self.storage.remove(StorageScope::Durable, &blob_key)?;
            return Err(StoreError::NotSignedIn);
        };

        match decrypt_record(&stored, &token) {
            Ok(record) => Ok(record),
            Err(e) => {
                // Sign-in may have degraded to plain storage; accept that
                // before giving up.
                if let Ok(record) = serde_json::from_str::<UserRecord>(&stored) {
                    return Ok(record);
                }
                warn!(username = %identity.username, "record blob undecryptable, discarding");
                self.storage.remove(StorageScope::Durable, &blob_key)?;
                Err(e.into())
            }
        }
    }

    /// One serialized read-modify-write cycle: decrypt, mutate, encrypt
    /// in full, overwrite. Caller holds `mutation_lock`.
    async fn mutate<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut UserRecord) -> StoreResult<()>,
    {
        let identity = self.current_session()?.ok_or(StoreError::NotSignedIn)?;
        let mut record = self.load_record_for(&identity)?;
        f(&mut record)?;
        self.persist_record(&identity, &record)
    }

    fn persist_record(&self, identity: &SessionIdentity, record: &UserRecord) -> StoreResult<()> {
        let blob_key = record_blob_key(&identity.user_id);
        if identity.is_local {
            self.storage
                .put(StorageScope::Durable, &blob_key, &serde_json::to_string(record)?)?;
            return Ok(());
        }

        let token = self
            .session_cache
            .get(&identity.username)?
            .ok_or(StoreError::NotSignedIn)?;
        let blob = encrypt_record(record, &token)?;
        self.storage.put(StorageScope::Durable, &blob_key, &blob)?;
        Ok(())
    }
}
