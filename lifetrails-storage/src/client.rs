//! The scoped storage pair used by the record store.

use crate::error::StorageResult;
use crate::file::FileTier;
use crate::tier::{KeyValueTier, MemoryTier};
use std::path::Path;

/// Lifetime scope of a stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageScope {
    /// Cleared when the process ends. Holds the unwrapped token.
    Session,
    /// Survives restarts. Holds encrypted blobs and the public identity.
    Durable,
}

/// One session tier plus one durable tier, addressed by scope.
pub struct ClientStorage {
    session: Box<dyn KeyValueTier>,
    durable: Box<dyn KeyValueTier>,
}

impl ClientStorage {
    /// Production storage: in-memory session tier, file-backed durable tier.
    pub fn open(durable_path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            session: Box::new(MemoryTier::new()),
            durable: Box::new(FileTier::open(durable_path.as_ref().to_path_buf())?),
        })
    }

    /// Fully in-memory storage for tests. "Durable" here survives
    /// sign-out but not process exit.
    pub fn in_memory() -> Self {
        Self {
            session: Box::new(MemoryTier::new()),
            durable: Box::new(MemoryTier::new()),
        }
    }

    fn tier(&self, scope: StorageScope) -> &dyn KeyValueTier {
        match scope {
            StorageScope::Session => self.session.as_ref(),
            StorageScope::Durable => self.durable.as_ref(),
        }
    }

    pub fn get(&self, scope: StorageScope, key: &str) -> StorageResult<Option<String>> {
        self.tier(scope).get(key)
    }

    pub fn put(&self, scope: StorageScope, key: &str, value: &str) -> StorageResult<()> {
        self.tier(scope).put(key, value)
    }

    pub fn remove(&self, scope: StorageScope, key: &str) -> StorageResult<()> {
        self.tier(scope).remove(key)
    }

    /// Drops everything in the session tier, simulating session end.
    pub fn end_session(&self) -> StorageResult<()> {
        self.session.clear()
    }
}
