//! Pantry Test Utilities
//!
//! Shared test infrastructure for the pantry workspace:
//! - A failure-injecting persistent store
//! - Proptest generators for recipes and queries
//! - Recipe fixtures for common scenarios
//! - Assertions over the error taxonomy

pub use pantry_core::{
    EngineConfig, ErrorKind, Ingredient, ManualClock, NutritionFacts, PantryError, PantryResult,
    Quantity, Recipe, RecipeDetails, RecipeDraft, RecipeId, SearchFilters, Season, StorageError,
    Timestamp,
};
pub use pantry_storage::{InMemoryStore, PersistentStore, StoreKey};

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

// ============================================================================
// FAILURE INJECTION
// ============================================================================

/// Persistent store that fails on demand.
///
/// Wraps another store and rejects index writes, all writes, or all reads
/// while the matching switch is on. Everything else passes through.
#[derive(Debug, Default)]
pub struct FlakyStore<S = InMemoryStore> {
    inner: S,
    fail_index_writes: AtomicBool,
    fail_all_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl FlakyStore<InMemoryStore> {
    pub fn new() -> Self {
        Self::wrap(InMemoryStore::new())
    }
}

impl<S> FlakyStore<S> {
    pub fn wrap(inner: S) -> Self {
        Self {
            inner,
            fail_index_writes: AtomicBool::new(false),
            fail_all_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Reject writes to the `recipe_index` key.
    pub fn fail_index_writes(&self, fail: bool) {
        self.fail_index_writes.store(fail, Ordering::SeqCst);
    }

    /// Reject every write.
    pub fn fail_all_writes(&self, fail: bool) {
        self.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    /// Report the store as unavailable on every read.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn rejects_write(&self, key: &StoreKey) -> bool {
        self.fail_all_writes.load(Ordering::SeqCst)
            || (*key == StoreKey::Index && self.fail_index_writes.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl<S: PersistentStore> PersistentStore for FlakyStore<S> {
    async fn get(&self, key: &StoreKey) -> PantryResult<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "injected read failure".to_string(),
            }
            .into());
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &StoreKey, value: Vec<u8>) -> PantryResult<()> {
        if self.rejects_write(key) {
            return Err(StorageError::WriteRejected {
                key: key.to_string(),
                reason: "injected write failure".to_string(),
            }
            .into());
        }
        self.inner.put(key, value).await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for recipes and queries.

    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    const CUISINES: &[&str] = &["Italian", "Thai", "Mexican", "Indian", "French", "Japanese"];
    const DIETS: &[&str] = &["vegetarian", "vegan", "gluten-free", "dairy-free", "keto"];
    const SEASONS: &[&str] = &["spring", "summer", "fall", "winter"];
    const INGREDIENTS: &[&str] = &[
        "Tomato", "Basil", "Garlic", "Onion", "Rice", "Chicken", "Tofu", "Lime", "Chili",
        "Potato", "Leek", "Butter", "Cream", "Egg", "Flour", "Ginger",
    ];
    const TEXT_QUANTITIES: &[&str] = &["1/2", "a pinch", "to taste", "2-3"];
    const UNITS: &[&str] = &["g", "ml", "cup", "tbsp"];
    const DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];
    // Collaborator fields the schema does not name.
    const EXTRA_KEYS: &[&str] = &["generated_from", "raw_response", "source", "model", "rating"];

    /// Generate a recipe id.
    pub fn arb_recipe_id() -> impl Strategy<Value = RecipeId> {
        "[a-z0-9_]{1,24}".prop_map(|s| RecipeId::new(format!("recipe_{}", s)))
    }

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // 2020-2030
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_cuisine() -> impl Strategy<Value = String> {
        prop::sample::select(CUISINES).prop_map(str::to_string)
    }

    pub fn arb_season() -> impl Strategy<Value = Season> {
        prop_oneof![
            Just(Season::Spring),
            Just(Season::Summer),
            Just(Season::Fall),
            Just(Season::Winter),
        ]
    }

    pub fn arb_quantity() -> impl Strategy<Value = Quantity> {
        prop_oneof![
            (0u32..4000).prop_map(|quarters| Quantity::Amount(f64::from(quarters) / 4.0)),
            prop::sample::select(TEXT_QUANTITIES)
                .prop_map(|s| Quantity::Text(s.to_string())),
        ]
    }

    pub fn arb_ingredient() -> impl Strategy<Value = Ingredient> {
        (
            prop::sample::select(INGREDIENTS),
            prop::option::of(arb_quantity()),
            prop::option::of(prop::sample::select(UNITS)),
        )
            .prop_map(|(name, quantity, unit)| Ingredient {
                name: name.to_string(),
                quantity,
                unit: unit.map(str::to_string),
                category: None,
            })
    }

    pub fn arb_nutrition() -> impl Strategy<Value = NutritionFacts> {
        // Whole numbers survive the JSON round trip exactly.
        (0u32..2000, 0u32..100, 0u32..300, 0u32..100, 0u32..50).prop_map(
            |(calories, protein, carbs, fat, fiber)| NutritionFacts {
                calories: f64::from(calories),
                protein: f64::from(protein),
                carbs: f64::from(carbs),
                fat: f64::from(fat),
                fiber: f64::from(fiber),
            },
        )
    }

    /// Generate a value for a collaborator field the schema does not name.
    pub fn arb_extra_value() -> impl Strategy<Value = serde_json::Value> {
        prop_oneof![
            "[A-Za-z0-9 ]{0,30}".prop_map(serde_json::Value::from),
            prop::collection::vec(prop::sample::select(INGREDIENTS), 0..4)
                .prop_map(serde_json::Value::from),
            any::<u32>().prop_map(serde_json::Value::from),
            any::<bool>().prop_map(serde_json::Value::from),
        ]
    }

    /// Generate the flattened `extra` map.
    pub fn arb_extra() -> impl Strategy<Value = serde_json::Map<String, serde_json::Value>> {
        prop::collection::vec(
            (prop::sample::select(EXTRA_KEYS), arb_extra_value()),
            0..4,
        )
        .prop_map(|fields| {
            fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect()
        })
    }

    /// Generate RecipeDetails with any subset of the indexed facets, the
    /// descriptive fields, and collaborator extras.
    pub fn arb_recipe_details() -> impl Strategy<Value = RecipeDetails> {
        let facets = (
            "[A-Za-z ]{1,40}",
            prop::option::of(arb_cuisine()),
            prop::option::of(1u32..240),
            prop::option::of(1u32..12),
            prop::collection::vec(arb_ingredient(), 0..6),
            prop::collection::vec("[A-Za-z ,.]{1,60}", 0..4),
            prop::option::of(arb_nutrition()),
            prop::sample::subsequence(DIETS, 0..=2),
            prop::sample::subsequence(SEASONS, 0..=2),
            prop::option::of(arb_timestamp()),
        );
        let descriptive = (
            prop::option::of("[A-Za-z ,.]{0,80}"),
            prop::option::of(prop::sample::select(DIFFICULTIES).prop_map(str::to_string)),
            prop::collection::vec("[a-z-]{1,16}", 0..4),
            prop::collection::vec("[A-Za-z ,.]{1,60}", 0..3),
            arb_extra(),
        );

        (facets, descriptive).prop_map(
            |(
                (
                    name,
                    cuisine,
                    cooking_time,
                    servings,
                    ingredients,
                    instructions,
                    nutrition,
                    diets,
                    seasons,
                    created_at,
                ),
                (description, difficulty, tags, tips, extra),
            )| RecipeDetails {
                name,
                description,
                cuisine,
                difficulty,
                cooking_time,
                servings,
                ingredients,
                instructions,
                nutrition,
                dietary_info: diets.into_iter().map(str::to_string).collect(),
                seasonal: seasons.into_iter().map(str::to_string).collect(),
                tags,
                tips,
                created_at,
                extra,
            },
        )
    }

    /// Generate a draft that carries its own id.
    pub fn arb_recipe_draft() -> impl Strategy<Value = RecipeDraft> {
        (arb_recipe_id(), arb_recipe_details())
            .prop_map(|(id, details)| RecipeDraft::with_id(id, details))
    }

    /// Generate drafts with pairwise distinct ids.
    pub fn arb_distinct_drafts(max: usize) -> impl Strategy<Value = Vec<RecipeDraft>> {
        prop::collection::vec(arb_recipe_details(), 1..=max).prop_map(|all| {
            all.into_iter()
                .enumerate()
                .map(|(n, details)| RecipeDraft::with_id(format!("recipe_{}", n), details))
                .collect()
        })
    }

    pub fn arb_search_filters() -> impl Strategy<Value = SearchFilters> {
        (
            prop::option::of(arb_cuisine()),
            prop::option::of(prop::sample::select(DIETS).prop_map(str::to_string)),
            prop::option::of(arb_season().prop_map(|s| s.to_string())),
        )
            .prop_map(|(cuisine, diet, season)| SearchFilters {
                cuisine,
                diet,
                season,
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built recipes for common testing scenarios.

    use super::*;
    use std::time::Duration;

    /// Small engine config: capacity 3, 60 second TTL.
    pub fn small_config() -> EngineConfig {
        EngineConfig::default()
            .with_cache_capacity(3)
            .with_cache_ttl(Duration::from_secs(60))
    }

    /// A draft with the given id, cuisine, and ingredient names.
    pub fn draft(id: &str, cuisine: Option<&str>, ingredients: &[&str]) -> RecipeDraft {
        let mut details = RecipeDetails::named(id);
        details.cuisine = cuisine.map(str::to_string);
        details.ingredients = ingredients.iter().map(|n| Ingredient::named(*n)).collect();
        RecipeDraft::with_id(id, details)
    }

    /// Italian, ingredient "Tomato".
    pub fn tomato_pasta() -> RecipeDraft {
        let mut draft = draft("tomato_pasta", Some("Italian"), &["Tomato", "Spaghetti", "Olive Oil"]);
        draft.details.description = Some("Weeknight pasta with a quick tomato sauce".to_string());
        draft.details.cooking_time = Some(25);
        draft.details.servings = Some(2);
        draft.details.dietary_info = vec!["vegetarian".to_string()];
        draft.details.seasonal = vec!["summer".to_string()];
        draft.details.instructions = vec![
            "Boil the pasta".to_string(),
            "Simmer the tomatoes with oil".to_string(),
            "Toss together".to_string(),
        ];
        draft
    }

    /// Italian, ingredient "Basil"; shares no ingredient with [`tomato_pasta`].
    pub fn basil_pesto() -> RecipeDraft {
        let mut draft = draft("basil_pesto", Some("Italian"), &["Basil", "Pine Nuts", "Parmesan"]);
        draft.details.dietary_info = vec!["vegetarian".to_string(), "gluten-free".to_string()];
        draft.details.seasonal = vec!["summer".to_string(), "spring".to_string()];
        draft
    }

    /// Thai, shares "Basil" with [`basil_pesto`].
    pub fn thai_green_curry() -> RecipeDraft {
        let mut draft = draft("thai_green_curry", Some("Thai"), &["Coconut Milk", "Thai Basil", "Chicken"]);
        draft.details.dietary_info = vec!["dairy-free".to_string()];
        draft.details.seasonal = vec!["fall".to_string()];
        draft.details.nutrition = Some(NutritionFacts {
            calories: 540.0,
            protein: 32.0,
            carbs: 18.0,
            fat: 38.0,
            fiber: 3.0,
        });
        draft
    }

    /// Irish, winter only.
    pub fn winter_stew() -> RecipeDraft {
        let mut draft = draft("winter_stew", Some("Irish"), &["Potato", "Leek", "Lamb"]);
        draft.details.seasonal = vec!["winter".to_string()];
        draft
    }

    /// No facets at all beyond the name.
    pub fn plain_toast() -> RecipeDraft {
        RecipeDraft::with_id("plain_toast", RecipeDetails::named("Toast"))
    }

    /// Every named fixture, in a fixed order.
    pub fn all() -> Vec<RecipeDraft> {
        vec![
            tomato_pasta(),
            basil_pesto(),
            thai_green_curry(),
            winter_stew(),
            plain_toast(),
        ]
    }

    /// `n` drafts `recipe_0 .. recipe_{n-1}` sharing one ingredient.
    pub fn numbered(n: usize) -> Vec<RecipeDraft> {
        (0..n)
            .map(|i| draft(&format!("recipe_{}", i), None, &["Salt"]))
            .collect()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over results and recipe lists.

    use super::*;

    #[track_caller]
    pub fn assert_kind<T: std::fmt::Debug>(result: &PantryResult<T>, kind: ErrorKind) {
        match result {
            Err(e) => assert_eq!(e.kind(), kind, "wrong error kind for {:?}", e),
            Ok(v) => panic!("Expected {:?} error, got Ok({:?})", kind, v),
        }
    }

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &PantryResult<T>) {
        assert_kind(result, ErrorKind::NotFound);
    }

    #[track_caller]
    pub fn assert_invalid_input<T: std::fmt::Debug>(result: &PantryResult<T>) {
        assert_kind(result, ErrorKind::InvalidInput);
    }

    #[track_caller]
    pub fn assert_storage_failure<T: std::fmt::Debug>(result: &PantryResult<T>) {
        assert_kind(result, ErrorKind::StorageFailure);
    }

    /// Assert the recipe ids, in order.
    #[track_caller]
    pub fn assert_ids(recipes: &[Recipe], expected: &[&str]) {
        let ids: Vec<&str> = recipes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, expected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_storage::PersistentStoreExt;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_flaky_store_rejects_only_index_writes() {
        let store = FlakyStore::new();
        store.fail_index_writes(true);

        let recipe_key = StoreKey::recipe(&RecipeId::from("a"));
        assert!(store.put(&recipe_key, b"{}".to_vec()).await.is_ok());

        let err = store.put(&StoreKey::Index, b"{}".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(!store.inner().contains(&StoreKey::Index));

        store.fail_index_writes(false);
        assert!(store.put(&StoreKey::Index, b"{}".to_vec()).await.is_ok());
    }

    #[tokio::test]
    async fn test_flaky_store_read_failure() {
        let store = FlakyStore::new();
        store.put_json(&StoreKey::Index, &1u32).await.unwrap();
        store.fail_reads(true);
        assertions::assert_storage_failure(&store.get(&StoreKey::Index).await);
    }

    #[test]
    fn test_fixtures_are_valid() {
        for draft in fixtures::all() {
            assert!(draft.validate().is_ok(), "{:?}", draft.id);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_drafts_are_valid(draft in generators::arb_recipe_draft()) {
            prop_assert!(draft.validate().is_ok());
        }

        #[test]
        fn prop_distinct_drafts_have_unique_ids(drafts in generators::arb_distinct_drafts(20)) {
            let mut ids: Vec<_> = drafts.iter().filter_map(|d| d.id.clone()).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), before);
        }
    }
}
