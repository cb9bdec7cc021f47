//! Named recipe caches.
//!
//! Each store name (`"global"`, a user id, ...) maps to exactly one running
//! actor. The first request for a name opens its persistent store through a
//! [`StoreProvider`] and spawns the actor; later requests get a clone of the
//! same handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pantry_core::{Clock, EngineConfig, PantryResult, StorageError, SystemClock};
use pantry_storage::{InMemoryStore, LmdbStore, PersistentStore};

use crate::actor::RecipeCacheHandle;
use crate::recipe_cache::RecipeCache;

/// Opens the persistent store behind a named cache.
pub trait StoreProvider: Send + Sync {
    type Store: PersistentStore + 'static;

    fn open(&self, name: &str) -> PantryResult<Arc<Self::Store>>;
}

/// One named LMDB database per cache, all in the same environment.
impl StoreProvider for LmdbStore {
    type Store = LmdbStore;

    fn open(&self, name: &str) -> PantryResult<Arc<LmdbStore>> {
        Ok(Arc::new(self.named(name)?))
    }
}

/// In-memory stores, kept for the life of the provider so a respawned
/// actor sees what its predecessor wrote.
#[derive(Debug, Default)]
pub struct InMemoryStores {
    stores: Mutex<HashMap<String, Arc<InMemoryStore>>>,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreProvider for InMemoryStores {
    type Store = InMemoryStore;

    fn open(&self, name: &str) -> PantryResult<Arc<InMemoryStore>> {
        let mut stores = self.stores.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryStore::new()))
            .clone())
    }
}

/// Lazily spawned recipe cache actors, keyed by name.
pub struct RecipeCacheRegistry<P: StoreProvider> {
    provider: P,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    handles: Mutex<HashMap<String, RecipeCacheHandle>>,
}

impl<P: StoreProvider> RecipeCacheRegistry<P> {
    pub fn new(provider: P, config: EngineConfig) -> PantryResult<Self> {
        Self::with_clock(provider, config, Arc::new(SystemClock))
    }

    pub fn with_clock(provider: P, config: EngineConfig, clock: Arc<dyn Clock>) -> PantryResult<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            config,
            clock,
            handles: Mutex::new(HashMap::new()),
        })
    }

    /// Handle for `name`, spawning its actor if none is running.
    ///
    /// An actor that has shut down is replaced by a fresh one over the same
    /// store. Must be called from within a tokio runtime.
    pub fn handle(&self, name: &str) -> PantryResult<RecipeCacheHandle> {
        let mut handles = self.handles.lock().map_err(|_| StorageError::LockPoisoned)?;

        if let Some(handle) = handles.get(name).filter(|h| !h.is_closed()) {
            return Ok(handle.clone());
        }

        let store = self.provider.open(name)?;
        let cache = RecipeCache::with_clock(name, store, self.config.clone(), self.clock.clone())?;
        let handle = RecipeCacheHandle::spawn(cache);
        handles.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Names with a live actor.
    pub fn names(&self) -> Vec<String> {
        self.handles
            .lock()
            .map(|h| {
                h.iter()
                    .filter(|(_, handle)| !handle.is_closed())
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stop every actor and forget its handle.
    pub async fn shutdown_all(&self) -> PantryResult<()> {
        let handles: Vec<RecipeCacheHandle> = {
            let mut handles = self.handles.lock().map_err(|_| StorageError::LockPoisoned)?;
            handles.drain().map(|(_, h)| h).collect()
        };
        for handle in handles {
            if !handle.is_closed() {
                handle.shutdown().await?;
            }
        }
        Ok(())
    }
}

impl<P: StoreProvider + std::fmt::Debug> std::fmt::Debug for RecipeCacheRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeCacheRegistry")
            .field("provider", &self.provider)
            .field("names", &self.names())
            .finish_non_exhaustive()
    }
}
