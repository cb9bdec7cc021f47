//! Single-writer actor around a [`RecipeCache`].
//!
//! One spawned task owns the cache and drains a bounded mailbox in order, so
//! the volatile cache and the index read-modify-write never see two callers
//! at once. [`RecipeCacheHandle`] is the cloneable front door: each call
//! sends a [`Command`] carrying a `oneshot` reply channel and awaits it.
//!
//! Once the task has stopped (after [`RecipeCacheHandle::shutdown`], or if
//! it panicked) every call fails with `ActorUnavailable`.

use std::sync::Arc;

use pantry_core::{
    PantryError, PantryResult, RankedRecipe, Recipe, RecipeDraft, RecipeId, SearchFilters,
    SearchResults, SetOutcome,
};
use pantry_storage::{CacheStats, PersistentStore};
use tokio::sync::{mpsc, oneshot};

use crate::recipe_cache::RecipeCache;

type Reply<T> = oneshot::Sender<PantryResult<T>>;

/// A request to the actor.
#[derive(Debug)]
pub enum Command {
    Get {
        id: RecipeId,
        reply: Reply<Recipe>,
    },
    Set {
        draft: RecipeDraft,
        reply: Reply<SetOutcome>,
    },
    Search {
        query: Option<String>,
        filters: SearchFilters,
        reply: Reply<SearchResults>,
    },
    BySeason {
        season: Option<String>,
        limit: Option<usize>,
        reply: Reply<Vec<Recipe>>,
    },
    Similar {
        id: RecipeId,
        limit: Option<usize>,
        reply: Reply<Vec<Recipe>>,
    },
    Popular {
        category: Option<String>,
        limit: Option<usize>,
        reply: Reply<Vec<RankedRecipe>>,
    },
    Reindex {
        id: RecipeId,
        reply: Reply<()>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to a running recipe cache.
#[derive(Debug, Clone)]
pub struct RecipeCacheHandle {
    name: Arc<str>,
    tx: mpsc::Sender<Command>,
}

impl RecipeCacheHandle {
    /// Move `cache` onto its own task and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(cache: RecipeCache<S>) -> Self
    where
        S: PersistentStore + 'static,
    {
        let name: Arc<str> = Arc::from(cache.name());
        let (tx, rx) = mpsc::channel(cache.config().mailbox_capacity);
        tokio::spawn(run(cache, rx));
        Self { name, tx }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once the actor has stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub async fn get(&self, id: &RecipeId) -> PantryResult<Recipe> {
        let id = id.clone();
        self.call(|reply| Command::Get { id, reply }).await
    }

    pub async fn set(&self, draft: RecipeDraft) -> PantryResult<SetOutcome> {
        self.call(|reply| Command::Set { draft, reply }).await
    }

    pub async fn search(
        &self,
        query: Option<&str>,
        filters: SearchFilters,
    ) -> PantryResult<SearchResults> {
        let query = query.map(str::to_string);
        self.call(|reply| Command::Search {
            query,
            filters,
            reply,
        })
        .await
    }

    pub async fn by_season(
        &self,
        season: Option<&str>,
        limit: Option<usize>,
    ) -> PantryResult<Vec<Recipe>> {
        let season = season.map(str::to_string);
        self.call(|reply| Command::BySeason {
            season,
            limit,
            reply,
        })
        .await
    }

    pub async fn similar(&self, id: &RecipeId, limit: Option<usize>) -> PantryResult<Vec<Recipe>> {
        let id = id.clone();
        self.call(|reply| Command::Similar { id, limit, reply })
            .await
    }

    pub async fn popular(
        &self,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> PantryResult<Vec<RankedRecipe>> {
        let category = category.map(str::to_string);
        self.call(|reply| Command::Popular {
            category,
            limit,
            reply,
        })
        .await
    }

    pub async fn reindex(&self, id: &RecipeId) -> PantryResult<()> {
        let id = id.clone();
        self.call(|reply| Command::Reindex { id, reply }).await
    }

    pub async fn stats(&self) -> PantryResult<CacheStats> {
        self.request(|reply| Command::Stats { reply }).await
    }

    /// Stop the actor after the commands already queued ahead of this one.
    pub async fn shutdown(&self) -> PantryResult<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn call<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> PantryResult<T> {
        self.request(command).await?
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> PantryResult<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| self.unavailable())?;
        response.await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> PantryError {
        PantryError::ActorUnavailable {
            name: self.name.to_string(),
        }
    }
}

async fn run<S: PersistentStore>(mut cache: RecipeCache<S>, mut rx: mpsc::Receiver<Command>) {
    tracing::info!(store = %cache.name(), "Recipe cache actor started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Get { id, reply } => {
                let _ = reply.send(cache.get(&id).await);
            }
            Command::Set { draft, reply } => {
                let _ = reply.send(cache.set(draft).await);
            }
            Command::Search {
                query,
                filters,
                reply,
            } => {
                let _ = reply.send(cache.search(query.as_deref(), filters).await);
            }
            Command::BySeason {
                season,
                limit,
                reply,
            } => {
                let _ = reply.send(cache.by_season(season.as_deref(), limit).await);
            }
            Command::Similar { id, limit, reply } => {
                let _ = reply.send(cache.similar(&id, limit).await);
            }
            Command::Popular {
                category,
                limit,
                reply,
            } => {
                let _ = reply.send(cache.popular(category.as_deref(), limit).await);
            }
            Command::Reindex { id, reply } => {
                let _ = reply.send(cache.reindex(&id).await);
            }
            Command::Stats { reply } => {
                let _ = reply.send(cache.stats());
            }
            Command::Shutdown { reply } => {
                rx.close();
                let _ = reply.send(());
                break;
            }
        }
    }

    tracing::info!(store = %cache.name(), stats = ?cache.stats(), "Recipe cache actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{EngineConfig, ErrorKind, RecipeDetails};
    use pantry_storage::InMemoryStore;

    fn handle() -> RecipeCacheHandle {
        let cache = RecipeCache::new(
            "global",
            Arc::new(InMemoryStore::new()),
            EngineConfig::default(),
        )
        .unwrap();
        RecipeCacheHandle::spawn(cache)
    }

    #[tokio::test]
    async fn test_set_then_get_through_handle() {
        let handle = handle();
        let outcome = handle
            .set(RecipeDraft::with_id("r1", RecipeDetails::named("Stew")))
            .await
            .unwrap();
        let recipe = handle.get(&outcome.id).await.unwrap();
        assert_eq!(recipe.details.name, "Stew");
    }

    #[tokio::test]
    async fn test_errors_cross_the_mailbox() {
        let handle = handle();
        let err = handle.get(&RecipeId::from("nope")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_shutdown_makes_handle_unavailable() {
        let handle = handle();
        let other = handle.clone();
        handle.shutdown().await.unwrap();

        let err = other.get(&RecipeId::from("r1")).await.unwrap_err();
        assert!(matches!(err, PantryError::ActorUnavailable { ref name } if name == "global"));
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(other.is_closed());
    }

    #[tokio::test]
    async fn test_stats_through_handle() {
        let handle = handle();
        handle
            .set(RecipeDraft::with_id("r1", RecipeDetails::named("Stew")))
            .await
            .unwrap();
        handle.get(&RecipeId::from("r1")).await.unwrap();

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entry_count, 1);
    }
}
