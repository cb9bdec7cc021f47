//! Two-tier recipe cache.
//!
//! A bounded, time-limited [`VolatileCache`] sits in front of an authoritative
//! [`PersistentStore`](crate::store::PersistentStore). [`ReadThroughCache`]
//! composes the two.
//!
//! # Eviction
//!
//! Eviction is FIFO by first insertion ([`InsertionOrder`]), not LRU. Reads
//! never protect an entry from eviction, and re-inserting an id already held
//! refreshes its timestamp without moving it to the back of the queue.
//!
//! # Expiry
//!
//! There is no background sweeper. An entry older than the TTL is removed
//! when a read for its id finds it, and reported as a miss.

pub mod policy;
pub mod read_through;
pub mod volatile;

pub use policy::{EvictionPolicy, InsertionOrder};
pub use read_through::{CacheRead, ReadSource, ReadThroughCache};
pub use volatile::{CacheConfig, CacheEntry, CacheStats, VolatileCache};
