//! Read-through / write-through coordinator over the two tiers.
//!
//! Reads try the volatile cache, fall back to the persistent store, and
//! repopulate the volatile cache on a miss. Writes go to the persistent store
//! first; the volatile cache is only touched once the store accepted them.

use std::sync::Arc;

use pantry_core::{PantryResult, Recipe, RecipeId, Timestamp};

use super::policy::{EvictionPolicy, InsertionOrder};
use super::volatile::{CacheStats, VolatileCache};
use crate::key::StoreKey;
use crate::store::{PersistentStore, PersistentStoreExt};

/// Which tier served a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Volatile,
    Persistent,
}

/// Result of a cache read, carrying where it came from.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    cached_at: Timestamp,
    source: ReadSource,
}

impl<T> CacheRead<T> {
    /// A read served from the volatile cache; `cached_at` is the insertion time.
    pub fn from_volatile(value: T, cached_at: Timestamp) -> Self {
        Self {
            value,
            cached_at,
            source: ReadSource::Volatile,
        }
    }

    /// A read that fell through to the persistent store.
    pub fn from_persistent(value: T, cached_at: Timestamp) -> Self {
        Self {
            value,
            cached_at,
            source: ReadSource::Persistent,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn cached_at(&self) -> Timestamp {
        self.cached_at
    }

    pub fn source(&self) -> ReadSource {
        self.source
    }

    /// Returns true if the volatile cache served this read.
    pub fn was_cache_hit(&self) -> bool {
        self.source == ReadSource::Volatile
    }
}

/// Recipe access through both tiers.
#[derive(Debug)]
pub struct ReadThroughCache<S, P: EvictionPolicy = InsertionOrder> {
    store: Arc<S>,
    volatile: VolatileCache<P>,
}

impl<S, P> ReadThroughCache<S, P>
where
    S: PersistentStore,
    P: EvictionPolicy,
{
    pub fn new(store: Arc<S>, volatile: VolatileCache<P>) -> Self {
        Self { store, volatile }
    }

    /// Fetch a recipe, or `None` if neither tier has it.
    pub async fn get(&mut self, id: &RecipeId) -> PantryResult<Option<CacheRead<Recipe>>> {
        if let Some(entry) = self.volatile.get(id) {
            return Ok(Some(CacheRead::from_volatile(
                entry.recipe.clone(),
                entry.inserted_at,
            )));
        }

        let Some(recipe) = self
            .store
            .get_json::<Recipe>(&StoreKey::recipe(id))
            .await?
        else {
            return Ok(None);
        };

        let cached_at = recipe.cached_at;
        self.volatile.put(recipe.clone());
        Ok(Some(CacheRead::from_persistent(recipe, cached_at)))
    }

    /// Persist a recipe, then cache it.
    ///
    /// If the store rejects the write the volatile cache is left untouched.
    pub async fn put(&mut self, recipe: Recipe) -> PantryResult<()> {
        self.store
            .put_json(&StoreKey::recipe(&recipe.id), &recipe)
            .await?;
        self.volatile.put(recipe);
        Ok(())
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn volatile(&self) -> &VolatileCache<P> {
        &self.volatile
    }

    pub fn stats(&self) -> CacheStats {
        self.volatile.stats()
    }
}
