//! The key/value tier trait and the in-memory implementation.

use crate::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// A flat string key/value store with one lifetime tier.
///
/// Implementations own their persistence; callers never see storage
/// internals. Values are opaque strings (encrypted blobs, plain JSON,
/// or tokens), decided by the caller.
pub trait KeyValueTier: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    fn clear(&self) -> StorageResult<()>;
}

/// In-memory tier. Backs the session scope (state dies with the process)
/// and the durable scope in tests.
#[derive(Default)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueTier for MemoryTier {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.clear();
        Ok(())
    }
}
