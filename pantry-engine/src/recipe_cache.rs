//! The per-store recipe pipeline.
//!
//! A [`RecipeCache`] owns one logical store: its volatile cache, its facet
//! index, and the engines that query them. Every method takes `&mut self`;
//! callers that share a store go through
//! [`RecipeCacheHandle`](crate::actor::RecipeCacheHandle), which owns the
//! cache on a single task.
//!
//! # Write pipeline
//!
//! `set` runs two steps:
//!
//! 1. **persist**: write the recipe to the persistent store, then to the
//!    volatile cache.
//! 2. **index**: fold the recipe into the facet index and write the index back.
//!
//! If step 2 fails the error is returned, but the recipe stays persisted and
//! cached: `get` finds it while search, similarity, and popularity do not.
//! Nothing reconciles this automatically; [`RecipeCache::reindex`] repairs a
//! single recipe.

use std::sync::Arc;

use pantry_core::{
    Clock, EngineConfig, PantryError, PantryResult, RankedRecipe, Recipe, RecipeDraft, RecipeId,
    SearchFilters, SearchResults, Season, SetOutcome, SystemClock, ValidationError,
};
use pantry_storage::{
    CacheConfig, CacheRead, CacheStats, IndexManager, IndexRecord, PersistentStore,
    ReadThroughCache, VolatileCache,
};

use crate::ranking::RankingService;
use crate::search::SearchEngine;
use crate::similarity::SimilarityEngine;

/// One logical recipe store.
#[derive(Debug)]
pub struct RecipeCache<S: PersistentStore> {
    name: String,
    tiers: ReadThroughCache<S>,
    index: IndexManager<S>,
    search: SearchEngine,
    similarity: SimilarityEngine,
    ranking: RankingService,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl<S: PersistentStore> RecipeCache<S> {
    /// Open a store on the system clock.
    pub fn new(name: impl Into<String>, store: Arc<S>, config: EngineConfig) -> PantryResult<Self> {
        Self::with_clock(name, store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: impl Into<String>,
        store: Arc<S>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> PantryResult<Self> {
        config.validate()?;

        let volatile = VolatileCache::new(CacheConfig::from(&config), clock.clone());
        Ok(Self {
            name: name.into(),
            tiers: ReadThroughCache::new(store.clone(), volatile),
            index: IndexManager::new(store, clock.clone()),
            search: SearchEngine::new(config.search_result_limit),
            similarity: SimilarityEngine::new(),
            ranking: RankingService::new(),
            config,
            clock,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.tiers.stats()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetch a recipe, or `NotFound`.
    pub async fn get(&mut self, id: &RecipeId) -> PantryResult<Recipe> {
        self.tiers
            .get(id)
            .await?
            .map(CacheRead::into_value)
            .ok_or_else(|| PantryError::not_found(id))
    }

    /// Fetch a recipe along with the tier that served it.
    pub async fn lookup(&mut self, id: &RecipeId) -> PantryResult<Option<CacheRead<Recipe>>> {
        self.tiers.get(id).await
    }

    /// The current persisted index.
    pub async fn index_snapshot(&self) -> PantryResult<IndexRecord> {
        self.index.load().await
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Store a recipe, assigning an id if it has none, and index it.
    pub async fn set(&mut self, draft: RecipeDraft) -> PantryResult<SetOutcome> {
        draft.validate()?;
        let recipe = draft.into_recipe(self.clock.now());
        let id = recipe.id.clone();

        self.persist(recipe.clone()).await?;
        self.index_recipe(&recipe).await?;

        Ok(SetOutcome { id, success: true })
    }

    /// Re-run the index step for a stored recipe.
    ///
    /// Like any index write this counts toward the recipe's popularity.
    pub async fn reindex(&mut self, id: &RecipeId) -> PantryResult<()> {
        let recipe = self.get(id).await?;
        self.index_recipe(&recipe).await
    }

    async fn persist(&mut self, recipe: Recipe) -> PantryResult<()> {
        self.tiers.put(recipe).await
    }

    async fn index_recipe(&mut self, recipe: &Recipe) -> PantryResult<()> {
        if let Err(e) = self.index.update(recipe).await {
            tracing::warn!(
                store = %self.name,
                recipe_id = %recipe.id,
                error = %e,
                "Recipe persisted but not indexed"
            );
            return Err(e);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Search by ingredient substring, narrowed by facet filters.
    ///
    /// A missing query is `InvalidInput`. An empty query is accepted and
    /// matches nothing.
    pub async fn search(
        &mut self,
        query: Option<&str>,
        filters: SearchFilters,
    ) -> PantryResult<SearchResults> {
        let query = query.ok_or_else(|| ValidationError::RequiredFieldMissing {
            field: "query".to_string(),
        })?;

        let index = self.index.load().await?;
        let ids = self.search.candidates(&index, query, &filters);
        let recipes = self.hydrate(&ids).await?;
        Ok(SearchResults::new(recipes, query, filters))
    }

    /// Recipes tagged with `season`, or with the current season if none is given.
    pub async fn by_season(
        &mut self,
        season: Option<&str>,
        limit: Option<usize>,
    ) -> PantryResult<Vec<Recipe>> {
        let season = match season.filter(|s| !s.is_empty()) {
            Some(season) => season.to_string(),
            None => Season::at(self.clock.now()).to_string(),
        };
        let limit = resolve_limit(limit, self.config.default_season_limit);

        let index = self.index.load().await?;
        let ids = self.ranking.by_season(&index, &season, limit);
        self.hydrate(&ids).await
    }

    /// Recipes sharing an ingredient or the cuisine of `id`.
    pub async fn similar(
        &mut self,
        id: &RecipeId,
        limit: Option<usize>,
    ) -> PantryResult<Vec<Recipe>> {
        let seed = self.get(id).await?;
        let limit = resolve_limit(limit, self.config.default_similar_limit);

        let index = self.index.load().await?;
        let ids = self.similarity.candidates(&index, &seed, limit);
        self.hydrate(&ids).await
    }

    /// Most-written recipes, or a cuisine's recipes when `category` names one.
    pub async fn popular(
        &mut self,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> PantryResult<Vec<RankedRecipe>> {
        let limit = resolve_limit(limit, self.config.default_popular_limit);

        let index = self.index.load().await?;
        let ranked = self.ranking.popular(&index, category, limit);

        let mut recipes = Vec::with_capacity(ranked.len());
        for (id, popularity_score) in ranked {
            if let Some(recipe) = self.hydrate_one(&id).await? {
                recipes.push(RankedRecipe {
                    recipe,
                    popularity_score,
                });
            }
        }
        Ok(recipes)
    }

    async fn hydrate(&mut self, ids: &[RecipeId]) -> PantryResult<Vec<Recipe>> {
        let mut recipes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(recipe) = self.hydrate_one(id).await? {
                recipes.push(recipe);
            }
        }
        Ok(recipes)
    }

    async fn hydrate_one(&mut self, id: &RecipeId) -> PantryResult<Option<Recipe>> {
        let read = self.tiers.get(id).await?;
        if read.is_none() {
            tracing::warn!(store = %self.name, recipe_id = %id, "Index names a recipe that is not stored");
        }
        Ok(read.map(CacheRead::into_value))
    }
}

/// A caller-supplied limit, or the default when absent or zero.
fn resolve_limit(limit: Option<usize>, default: usize) -> usize {
    limit.filter(|&n| n > 0).unwrap_or(default)
}
