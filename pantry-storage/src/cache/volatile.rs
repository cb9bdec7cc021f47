//! Bounded, time-limited, in-process recipe cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use pantry_core::config::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};
use pantry_core::{Clock, EngineConfig, Recipe, RecipeId, SystemClock, Timestamp};

use super::policy::{EvictionPolicy, InsertionOrder};

/// Configuration for the volatile cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries held before one is evicted.
    pub capacity: usize,
    /// Age at which an entry is discarded on read.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl From<&EngineConfig> for CacheConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            capacity: config.cache_capacity,
            ttl: config.cache_ttl,
        }
    }
}

/// A cached recipe and the instant it was (re)inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub recipe: Recipe,
    pub inserted_at: Timestamp,
}

impl CacheEntry {
    fn is_fresh(&self, now: Timestamp, ttl: TimeDelta) -> bool {
        now - self.inserted_at < ttl
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from the cache.
    pub hits: u64,
    /// Reads that found nothing, or found an expired entry.
    pub misses: u64,
    /// Entries discarded on read because they outlived the TTL.
    pub expirations: u64,
    /// Entries removed because the cache was over capacity.
    pub evictions: u64,
    /// Entries currently held.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Volatile recipe cache.
///
/// Expiry is lazy: an entry past its TTL is only removed when a read for its
/// id finds it. Capacity is enforced on every insert by evicting exactly one
/// entry chosen by the [`EvictionPolicy`].
///
/// The cache takes `&mut self` everywhere; it is meant to be owned by a
/// single task and needs no locking of its own.
#[derive(Debug)]
pub struct VolatileCache<P: EvictionPolicy = InsertionOrder> {
    entries: HashMap<RecipeId, CacheEntry>,
    policy: P,
    capacity: usize,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    stats: CacheStats,
}

impl VolatileCache<InsertionOrder> {
    /// FIFO-by-insertion cache on the given clock.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(config, clock, InsertionOrder::new())
    }
}

impl Default for VolatileCache<InsertionOrder> {
    fn default() -> Self {
        Self::new(CacheConfig::default(), Arc::new(SystemClock))
    }
}

impl<P: EvictionPolicy> VolatileCache<P> {
    pub fn with_policy(config: CacheConfig, clock: Arc<dyn Clock>, policy: P) -> Self {
        Self {
            entries: HashMap::with_capacity(config.capacity.min(4096)),
            policy,
            capacity: config.capacity,
            ttl: TimeDelta::from_std(config.ttl).unwrap_or(TimeDelta::MAX),
            clock,
            stats: CacheStats::default(),
        }
    }

    /// Look up a recipe, discarding it if it has expired.
    pub fn get(&mut self, id: &RecipeId) -> Option<&CacheEntry> {
        let now = self.clock.now();
        let fresh = match self.entries.get(id) {
            Some(entry) => entry.is_fresh(now, self.ttl),
            None => {
                self.stats.misses += 1;
                tracing::debug!(recipe_id = %id, "Volatile cache miss");
                return None;
            }
        };

        if !fresh {
            self.entries.remove(id);
            self.policy.on_remove(id);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            tracing::debug!(recipe_id = %id, "Volatile cache entry expired");
            return None;
        }

        self.stats.hits += 1;
        self.policy.on_access(id);
        tracing::debug!(recipe_id = %id, "Volatile cache hit");
        self.entries.get(id)
    }

    /// Insert or overwrite a recipe, stamping it with the current time.
    ///
    /// Returns the id evicted to make room, if any.
    pub fn put(&mut self, recipe: Recipe) -> Option<RecipeId> {
        let id = recipe.id.clone();
        let entry = CacheEntry {
            recipe,
            inserted_at: self.clock.now(),
        };
        let is_new = self.entries.insert(id.clone(), entry).is_none();
        self.policy.on_insert(&id, is_new);

        if self.entries.len() <= self.capacity {
            return None;
        }

        let victim = self.policy.victim()?;
        self.entries.remove(&victim);
        self.stats.evictions += 1;
        tracing::debug!(recipe_id = %victim, capacity = self.capacity, "Evicted from volatile cache");
        Some(victim)
    }

    /// Whether an entry is held for `id`, fresh or not. Does not touch stats.
    pub fn contains(&self, id: &RecipeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len() as u64,
            ..self.stats
        }
    }
}
