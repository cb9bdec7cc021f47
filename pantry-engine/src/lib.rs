//! Pantry Engine - Recipe Cache and Query Services
//!
//! [`RecipeCache`] is the per-store pipeline over the storage tiers and the
//! facet index. [`RecipeCacheHandle`] runs one cache as a single-writer actor,
//! and [`RecipeCacheRegistry`] hands out one actor per store name.
//!
//! # Example
//!
//! ```ignore
//! let registry = RecipeCacheRegistry::new(InMemoryStores::new(), EngineConfig::from_env())?;
//! let global = registry.handle("global")?;
//!
//! let outcome = global.set(draft).await?;
//! let hits = global.search(Some("tomato"), SearchFilters::new().cuisine("Italian")).await?;
//! let related = global.similar(&outcome.id, None).await?;
//! ```

pub mod actor;
pub mod candidates;
pub mod ranking;
pub mod recipe_cache;
pub mod registry;
pub mod search;
pub mod similarity;
pub mod telemetry;

pub use actor::{Command, RecipeCacheHandle};
pub use candidates::CandidateSet;
pub use ranking::RankingService;
pub use recipe_cache::RecipeCache;
pub use registry::{InMemoryStores, RecipeCacheRegistry, StoreProvider};
pub use search::SearchEngine;
pub use similarity::SimilarityEngine;
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};
