//! Pantry Storage - Cache Tiers and Facet Index
//!
//! - [`store`]: the persistent key/value contract and an in-memory backend
//! - [`lmdb`]: durable LMDB backend
//! - [`cache`]: the volatile cache and the read-through coordinator
//! - [`index`]: the aggregate facet index and its manager

pub mod cache;
pub mod index;
pub mod key;
pub mod lmdb;
pub mod ordered_map;
pub mod store;

pub use cache::{
    CacheConfig, CacheEntry, CacheRead, CacheStats, EvictionPolicy, InsertionOrder, ReadSource,
    ReadThroughCache, VolatileCache,
};
pub use index::{Facet, IndexManager, IndexRecord};
pub use key::StoreKey;
pub use lmdb::{LmdbStore, LmdbStoreError};
pub use ordered_map::OrderedMap;
pub use store::{InMemoryStore, PersistentStore, PersistentStoreExt};
