//! LMDB-backed persistent store.
//!
//! Uses the heed crate (Rust bindings for LMDB) for a memory-mapped, durable
//! key/value store. One environment can host several named recipe stores
//! (one per cache instance); each lives in its own LMDB database.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses a read transaction for
//! `get` and a write transaction per `put`, so a failed `put` leaves the
//! previous value in place.

use std::path::Path;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use pantry_core::{PantryError, PantryResult, StorageError};

use crate::key::StoreKey;
use crate::store::PersistentStore;

/// Maximum number of named stores per environment.
const MAX_NAMED_STORES: u32 = 64;

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for PantryError {
    fn from(e: LmdbStoreError) -> Self {
        PantryError::Storage(StorageError::Unavailable {
            reason: e.to_string(),
        })
    }
}

/// Durable recipe store on LMDB.
///
/// # Example
///
/// ```ignore
/// let store = LmdbStore::open("/var/lib/pantry", 64)?;
/// let global = store.named("global")?;
/// global.put(&StoreKey::Index, bytes).await?;
/// ```
#[derive(Clone)]
pub struct LmdbStore {
    env: Env,
    db: Database<Bytes, Bytes>,
}

impl std::fmt::Debug for LmdbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbStore")
            .field("path", &self.env.path())
            .finish_non_exhaustive()
    }
}

impl LmdbStore {
    /// Open (or create) an LMDB environment and its default database.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the environment in megabytes
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per path by this process and
        // never memory-mapped elsewhere.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(MAX_NAMED_STORES)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let db = Self::create_db(&env, None)?;
        Ok(Self { env, db })
    }

    /// A store in its own named database inside the same environment.
    pub fn named(&self, name: &str) -> Result<Self, LmdbStoreError> {
        let db = Self::create_db(&self.env, Some(name))?;
        Ok(Self {
            env: self.env.clone(),
            db,
        })
    }

    fn create_db(env: &Env, name: Option<&str>) -> Result<Database<Bytes, Bytes>, LmdbStoreError> {
        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, name)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(db)
    }

    /// Number of keys in this store.
    pub fn len(&self) -> Result<u64, LmdbStoreError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        self.db
            .len(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, LmdbStoreError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl PersistentStore for LmdbStore {
    async fn get(&self, key: &StoreKey) -> PantryResult<Option<Vec<u8>>> {
        let encoded_key = key.encode();

        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let value = self
            .db
            .get(&rtxn, &encoded_key)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(value.map(|bytes| bytes.to_vec()))
    }

    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> PantryResult<()> {
        let encoded_key = key.encode();
        let rejected = |reason: String| StorageError::WriteRejected {
            key: key.to_string(),
            reason,
        };

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| rejected(e.to_string()))?;

        self.db
            .put(&mut wtxn, &encoded_key, &value)
            .map_err(|e| rejected(e.to_string()))?;

        wtxn.commit().map_err(|e| rejected(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PersistentStoreExt;
    use pantry_core::RecipeId;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbStore::open(temp_dir.path(), 10).expect("store creation should succeed");
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (store, _temp_dir) = create_test_store();
        let key = StoreKey::recipe(&RecipeId::from("recipe_1"));

        store
            .put(&key, b"{\"name\":\"Soup\"}".to_vec())
            .await
            .expect("put should succeed");

        let value = store.get(&key).await.expect("get should succeed");
        assert_eq!(value, Some(b"{\"name\":\"Soup\"}".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let (store, _temp_dir) = create_test_store();
        let value = store
            .get(&StoreKey::recipe(&RecipeId::from("missing")))
            .await
            .expect("get should succeed");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let (store, _temp_dir) = create_test_store();
        store.put_json(&StoreKey::Index, &vec![1u32]).await.unwrap();
        store.put_json(&StoreKey::Index, &vec![1u32, 2]).await.unwrap();

        let value: Option<Vec<u32>> = store.get_json(&StoreKey::Index).await.unwrap();
        assert_eq!(value, Some(vec![1, 2]));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_named_stores_are_isolated() {
        let (store, _temp_dir) = create_test_store();
        let global = store.named("global").expect("named store");
        let staging = store.named("staging").expect("named store");

        global.put(&StoreKey::Index, b"g".to_vec()).await.unwrap();

        assert_eq!(
            global.get(&StoreKey::Index).await.unwrap(),
            Some(b"g".to_vec())
        );
        assert!(staging.get(&StoreKey::Index).await.unwrap().is_none());
        assert!(store.get(&StoreKey::Index).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let key = StoreKey::recipe(&RecipeId::from("durable"));
        {
            let store = LmdbStore::open(temp_dir.path(), 10).unwrap();
            store.put(&key, b"kept".to_vec()).await.unwrap();
            let env = store.env.clone();
            drop(store);
            env.prepare_for_closing().wait();
        }

        let reopened = LmdbStore::open(temp_dir.path(), 10).unwrap();
        assert_eq!(reopened.get(&key).await.unwrap(), Some(b"kept".to_vec()));
    }
}
