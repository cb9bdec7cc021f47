//! Persistent store contract.
//!
//! The persistent tier is authoritative for every read that misses the
//! volatile cache: no expiry, no size bound, last write wins. Backends only
//! move bytes; JSON encoding lives in [`PersistentStoreExt`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use pantry_core::{PantryResult, StorageError};
use serde::{de::DeserializeOwned, Serialize};

use crate::key::StoreKey;

/// Durable key/value storage.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing was ever written there.
    async fn get(&self, key: &StoreKey) -> PantryResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> PantryResult<()>;
}

#[async_trait]
impl<S: PersistentStore + ?Sized> PersistentStore for Arc<S> {
    async fn get(&self, key: &StoreKey) -> PantryResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> PantryResult<()> {
        (**self).put(key, value).await
    }
}

/// Typed JSON access on top of any [`PersistentStore`].
#[async_trait]
pub trait PersistentStoreExt: PersistentStore {
    /// Read and decode the JSON value under `key`.
    async fn get_json<T>(&self, key: &StoreKey) -> PantryResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                StorageError::Serialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and write it under `key`.
    async fn put_json<T>(&self, key: &StoreKey, value: &T) -> PantryResult<()>
    where
        T: Serialize + Sync,
    {
        let bytes = serde_json::to_vec(value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.put(key, bytes).await
    }
}

impl<S: PersistentStore + ?Sized> PersistentStoreExt for S {}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory persistent store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<StoreKey, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held (recipes plus the index, if written).
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &StoreKey) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

#[async_trait]
impl PersistentStore for InMemoryStore {
    async fn get(&self, key: &StoreKey) -> PantryResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> PantryResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key.clone(), value);
        Ok(())
    }
}
