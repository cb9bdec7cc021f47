//! Facet index over stored recipes.
//!
//! One aggregate [`IndexRecord`] lives under the `recipe_index` key. It maps
//! cuisine, dietary tag, seasonal tag, and lowercased ingredient name to the
//! ids of recipes carrying them, and keeps a per-id popularity counter.
//!
//! Every facet is insertion-ordered: ids appear in the order they were first
//! indexed and keys in the order they were first seen. Nothing is ever
//! removed. [`IndexManager::update`] is a read-modify-write of the whole
//! record and relies on the owning actor for exclusion.

use std::sync::Arc;

use pantry_core::{Clock, PantryResult, Recipe, RecipeId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::key::StoreKey;
use crate::ordered_map::OrderedMap;
use crate::store::{PersistentStore, PersistentStoreExt};

/// Facet value to the recipes carrying it.
pub type Facet = OrderedMap<String, Vec<RecipeId>>;

/// The aggregate index value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(default)]
    by_cuisine: Facet,
    #[serde(default)]
    by_diet: Facet,
    #[serde(default)]
    by_season: Facet,
    #[serde(default)]
    by_ingredient: Facet,
    #[serde(default)]
    popularity_scores: OrderedMap<RecipeId, u64>,
    last_updated: Timestamp,
}

fn append_unique(facet: &mut Facet, key: String, id: &RecipeId) {
    let ids = facet.get_or_insert_with(key, Vec::new);
    if !ids.contains(id) {
        ids.push(id.clone());
    }
}

impl IndexRecord {
    /// A record with every facet empty.
    pub fn empty(now: Timestamp) -> Self {
        Self {
            by_cuisine: Facet::new(),
            by_diet: Facet::new(),
            by_season: Facet::new(),
            by_ingredient: Facet::new(),
            popularity_scores: OrderedMap::new(),
            last_updated: now,
        }
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    pub fn index_cuisine(&mut self, cuisine: &str, id: &RecipeId) {
        append_unique(&mut self.by_cuisine, cuisine.to_string(), id);
    }

    pub fn index_diet(&mut self, tag: &str, id: &RecipeId) {
        append_unique(&mut self.by_diet, tag.to_string(), id);
    }

    pub fn index_season(&mut self, tag: &str, id: &RecipeId) {
        append_unique(&mut self.by_season, tag.to_string(), id);
    }

    /// Index under the lowercased ingredient name.
    pub fn index_ingredient(&mut self, name: &str, id: &RecipeId) {
        append_unique(&mut self.by_ingredient, name.to_lowercase(), id);
    }

    /// Add one to the popularity counter of `id` and return the new value.
    pub fn bump_popularity(&mut self, id: &RecipeId) -> u64 {
        let score = self.popularity_scores.get_or_insert_with(id.clone(), || 0);
        *score += 1;
        *score
    }

    /// Index every facet the recipe carries and count the write.
    ///
    /// Absent or blank cuisine is skipped. Writing the same id again adds
    /// nothing to the facets but still increments its popularity.
    pub fn index_recipe(&mut self, recipe: &Recipe, now: Timestamp) {
        let id = &recipe.id;
        let details = &recipe.details;

        if let Some(cuisine) = details.cuisine.as_deref().filter(|c| !c.is_empty()) {
            self.index_cuisine(cuisine, id);
        }
        for tag in &details.dietary_info {
            self.index_diet(tag, id);
        }
        for tag in &details.seasonal {
            self.index_season(tag, id);
        }
        for ingredient in &details.ingredients {
            self.index_ingredient(&ingredient.name, id);
        }
        self.bump_popularity(id);
        self.last_updated = now;
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn cuisine(&self, cuisine: &str) -> Option<&[RecipeId]> {
        self.by_cuisine.get(cuisine).map(Vec::as_slice)
    }

    pub fn diet(&self, tag: &str) -> Option<&[RecipeId]> {
        self.by_diet.get(tag).map(Vec::as_slice)
    }

    pub fn season(&self, tag: &str) -> Option<&[RecipeId]> {
        self.by_season.get(tag).map(Vec::as_slice)
    }

    /// Ids under an exact (already lowercased) ingredient key.
    pub fn ingredient(&self, name: &str) -> Option<&[RecipeId]> {
        self.by_ingredient.get(name).map(Vec::as_slice)
    }

    /// Ingredient keys with their ids, in discovery order.
    pub fn ingredients(&self) -> impl Iterator<Item = (&str, &[RecipeId])> + '_ {
        self.by_ingredient
            .iter()
            .map(|(k, ids)| (k.as_str(), ids.as_slice()))
    }

    pub fn ingredient_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_ingredient.keys().map(String::as_str)
    }

    /// Popularity counter for `id` (zero if never written).
    pub fn popularity(&self, id: &RecipeId) -> u64 {
        self.popularity_scores.get(id).copied().unwrap_or(0)
    }

    /// Every known id with its counter, highest first. Ties keep the order in
    /// which the ids were first written.
    pub fn popularity_ranking(&self) -> Vec<(RecipeId, u64)> {
        let mut ranking: Vec<(RecipeId, u64)> = self
            .popularity_scores
            .iter()
            .map(|(id, score)| (id.clone(), *score))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        ranking
    }

    pub fn known_ids(&self) -> usize {
        self.popularity_scores.len()
    }

    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

/// Owns reads and writes of the persisted [`IndexRecord`].
#[derive(Debug)]
pub struct IndexManager<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: PersistentStore> IndexManager<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The persisted record, or an empty one if none was ever written.
    pub async fn load(&self) -> PantryResult<IndexRecord> {
        Ok(self
            .store
            .get_json::<IndexRecord>(&StoreKey::Index)
            .await?
            .unwrap_or_else(|| IndexRecord::empty(self.clock.now())))
    }

    /// Fold `recipe` into the index and write the record back as one value.
    ///
    /// If the final write fails, the stored record is left as it was.
    pub async fn update(&self, recipe: &Recipe) -> PantryResult<IndexRecord> {
        let mut record = self.load().await?;
        record.index_recipe(recipe, self.clock.now());
        self.store.put_json(&StoreKey::Index, &record).await?;
        tracing::debug!(
            recipe_id = %recipe.id,
            popularity = record.popularity(&recipe.id),
            "Index updated"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::Utc;
    use pantry_core::{Ingredient, ManualClock, RecipeDetails, RecipeDraft};

    fn recipe(id: &str, cuisine: Option<&str>, ingredients: &[&str]) -> Recipe {
        let mut details = RecipeDetails::named(id);
        details.cuisine = cuisine.map(str::to_string);
        details.ingredients = ingredients.iter().map(|n| Ingredient::named(*n)).collect();
        RecipeDraft::with_id(id, details).into_recipe(Utc::now())
    }

    fn ids(list: Option<&[RecipeId]>) -> Vec<&str> {
        list.unwrap_or_default().iter().map(RecipeId::as_str).collect()
    }

    #[test]
    fn test_index_recipe_fills_facets() {
        let mut details = RecipeDetails::named("salad");
        details.cuisine = Some("Greek".to_string());
        details.dietary_info = vec!["vegetarian".to_string(), "gluten-free".to_string()];
        details.seasonal = vec!["summer".to_string()];
        details.ingredients = vec![Ingredient::named("Feta"), Ingredient::named("Cucumber")];
        let salad = RecipeDraft::with_id("salad", details).into_recipe(Utc::now());

        let mut record = IndexRecord::empty(Utc::now());
        record.index_recipe(&salad, Utc::now());

        assert_eq!(ids(record.cuisine("Greek")), vec!["salad"]);
        assert_eq!(ids(record.diet("gluten-free")), vec!["salad"]);
        assert_eq!(ids(record.season("summer")), vec!["salad"]);
        assert_eq!(ids(record.ingredient("feta")), vec!["salad"]);
        assert!(record.ingredient("Feta").is_none());
        assert_eq!(record.popularity(&salad.id), 1);
    }

    #[test]
    fn test_reindex_dedups_but_counts() {
        let r = recipe("a", Some("Italian"), &["Tomato", "tomato"]);
        let mut record = IndexRecord::empty(Utc::now());
        record.index_recipe(&r, Utc::now());
        record.index_recipe(&r, Utc::now());

        assert_eq!(ids(record.cuisine("Italian")), vec!["a"]);
        assert_eq!(ids(record.ingredient("tomato")), vec!["a"]);
        assert_eq!(record.popularity(&r.id), 2);
    }

    #[test]
    fn test_missing_facets_are_skipped() {
        let r = recipe("plain", None, &[]);
        let mut record = IndexRecord::empty(Utc::now());
        record.index_recipe(&r, Utc::now());

        assert_eq!(record.ingredient_keys().count(), 0);
        assert_eq!(record.popularity(&r.id), 1);
        assert!(record.cuisine("").is_none());
    }

    #[test]
    fn test_ranking_is_descending_and_stable() {
        let mut record = IndexRecord::empty(Utc::now());
        for id in ["a", "b", "c"] {
            record.bump_popularity(&RecipeId::from(id));
        }
        record.bump_popularity(&RecipeId::from("c"));

        let ranking: Vec<_> = record
            .popularity_ranking()
            .into_iter()
            .map(|(id, score)| (id.as_str().to_string(), score))
            .collect();
        assert_eq!(
            ranking,
            vec![
                ("c".to_string(), 2),
                ("a".to_string(), 1),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_record_json_round_trip_keeps_order() {
        let mut record = IndexRecord::empty(Utc::now());
        record.index_ingredient("Zucchini", &RecipeId::from("z"));
        record.index_ingredient("apple", &RecipeId::from("a"));

        let json = serde_json::to_string(&record).unwrap();
        let back: IndexRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back, record);
        assert_eq!(back.ingredient_keys().collect::<Vec<_>>(), vec!["zucchini", "apple"]);
    }

    #[tokio::test]
    async fn test_manager_creates_record_lazily() {
        let store = Arc::new(InMemoryStore::new());
        let clock = ManualClock::starting_now();
        let manager = IndexManager::new(store.clone(), Arc::new(clock.clone()));

        let empty = manager.load().await.unwrap();
        assert_eq!(empty.known_ids(), 0);
        assert!(!store.contains(&StoreKey::Index));

        manager
            .update(&recipe("a", Some("Thai"), &["Basil"]))
            .await
            .unwrap();
        assert!(store.contains(&StoreKey::Index));

        let loaded = manager.load().await.unwrap();
        assert_eq!(ids(loaded.cuisine("Thai")), vec!["a"]);
        assert_eq!(loaded.last_updated(), clock.now());
    }

    #[tokio::test]
    async fn test_manager_accumulates_across_updates() {
        let store = Arc::new(InMemoryStore::new());
        let manager = IndexManager::new(store, Arc::new(ManualClock::starting_now()));

        manager.update(&recipe("a", Some("Thai"), &[])).await.unwrap();
        manager.update(&recipe("b", Some("Thai"), &[])).await.unwrap();
        let record = manager.update(&recipe("a", Some("Thai"), &[])).await.unwrap();

        assert_eq!(ids(record.cuisine("Thai")), vec!["a", "b"]);
        assert_eq!(record.popularity(&RecipeId::from("a")), 2);
    }
}
