//! Property-Based Tests for the Recipe Cache
//!
//! Properties:
//! - A recipe written with `set` is returned unchanged by `get`, also after
//!   being read and written back
//! - The volatile tier never holds more than its capacity and evicts oldest first
//! - Entries are served from memory until their TTL and from the store after
//! - Every successful write counts once toward popularity
//! - Search results only contain recipes whose ingredients match the query

use std::sync::Arc;
use std::time::Duration;

use pantry_engine::RecipeCache;
use pantry_storage::{InMemoryStore, ReadSource};
use pantry_test_utils::generators::*;
use pantry_test_utils::*;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn cache_with(config: EngineConfig, clock: &ManualClock) -> RecipeCache<InMemoryStore> {
    RecipeCache::with_clock(
        "global",
        Arc::new(InMemoryStore::new()),
        config,
        Arc::new(clock.clone()),
    )
    .unwrap()
}

// ============================================================================
// ROUND TRIP
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: get(set(draft).id) returns the draft's details with the write time.
    #[test]
    fn prop_set_then_get_round_trips(draft in arb_recipe_draft(), at in arb_timestamp()) {
        let clock = ManualClock::new(at);
        let mut cache = cache_with(EngineConfig::default(), &clock);

        let expected = draft.details.clone();
        let recipe = runtime().block_on(async {
            let outcome = cache.set(draft).await?;
            cache.get(&outcome.id).await
        }).unwrap();

        prop_assert_eq!(recipe.details, expected);
        prop_assert_eq!(recipe.cached_at, at);
    }

    /// Property: the round trip survives a cold volatile tier.
    #[test]
    fn prop_round_trip_from_persistent_tier(draft in arb_recipe_draft()) {
        let clock = ManualClock::starting_now();
        let store = Arc::new(InMemoryStore::new());
        let expected = draft.details.clone();

        let recipe = runtime().block_on(async {
            let mut writer = RecipeCache::with_clock(
                "global", store.clone(), EngineConfig::default(), Arc::new(clock.clone()))?;
            let id = writer.set(draft).await?.id;

            let mut reader = RecipeCache::with_clock(
                "global", store, EngineConfig::default(), Arc::new(clock.clone()))?;
            let read = reader.lookup(&id).await?.ok_or_else(|| PantryError::not_found(&id))?;
            assert_eq!(read.source(), ReadSource::Persistent);
            Ok::<_, PantryError>(read.into_value())
        }).unwrap();

        prop_assert_eq!(recipe.details, expected);
    }

    /// Property: a recipe read with `get` and written back unchanged is still
    /// readable from the persistent tier, with a fresh `cached_at`.
    #[test]
    fn prop_fetched_recipe_written_back_round_trips(draft in arb_recipe_draft()) {
        let clock = ManualClock::starting_now();
        let store = Arc::new(InMemoryStore::new());
        let expected = draft.details.clone();

        let (recipe, rewritten_at) = runtime().block_on(async {
            let mut writer = RecipeCache::with_clock(
                "global", store.clone(), EngineConfig::default(), Arc::new(clock.clone()))?;
            let id = writer.set(draft).await?.id;
            let fetched = writer.get(&id).await?;

            let json = serde_json::to_value(&fetched).unwrap();
            let resubmitted: RecipeDraft = serde_json::from_value(json).unwrap();
            clock.advance(Duration::from_secs(5));
            writer.set(resubmitted).await?;
            let rewritten_at = fetched.cached_at + chrono::Duration::seconds(5);

            let mut reader = RecipeCache::with_clock(
                "global", store, EngineConfig::default(), Arc::new(clock.clone()))?;
            Ok::<_, PantryError>((reader.get(&id).await?, rewritten_at))
        }).unwrap();

        prop_assert_eq!(recipe.details, expected);
        prop_assert_eq!(recipe.cached_at, rewritten_at);
    }
}

// ============================================================================
// EVICTION AND EXPIRY
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    /// Property: after n > capacity writes, exactly the first n - capacity
    /// recipes have left the volatile tier.
    #[test]
    fn prop_eviction_is_fifo(capacity in 1usize..8, extra in 1usize..8) {
        let clock = ManualClock::starting_now();
        let mut cache = cache_with(EngineConfig::default().with_cache_capacity(capacity), &clock);
        let drafts = fixtures::numbered(capacity + extra);
        let ids: Vec<RecipeId> = drafts.iter().filter_map(|d| d.id.clone()).collect();

        runtime().block_on(async {
            for draft in drafts {
                cache.set(draft).await?;
            }
            assert_eq!(cache.stats().entry_count, capacity as u64);
            assert_eq!(cache.stats().evictions, extra as u64);

            // Newest first so the repopulating misses below do not disturb
            // the entries still to be checked.
            for (n, id) in ids.iter().enumerate().rev() {
                let source = cache.lookup(id).await?.map(|r| r.source());
                let expected = if n < extra { ReadSource::Persistent } else { ReadSource::Volatile };
                assert_eq!(source, Some(expected), "recipe {}", n);
            }
            Ok::<_, PantryError>(())
        }).unwrap();
    }

    /// Property: an entry is fresh strictly before its TTL and stale at it.
    /// `ttl_secs >= 1` keeps `before_ms` below the TTL.
    #[test]
    fn prop_ttl_boundary(ttl_secs in 1u64..3600, before_ms in 1u64..1000) {
        let clock = ManualClock::starting_now();
        let ttl = Duration::from_secs(ttl_secs);
        let mut cache = cache_with(EngineConfig::default().with_cache_ttl(ttl), &clock);

        runtime().block_on(async {
            let id = cache.set(fixtures::tomato_pasta()).await?.id;

            clock.advance(ttl - Duration::from_millis(before_ms));
            let fresh = cache.lookup(&id).await?.map(|r| r.source());
            assert_eq!(fresh, Some(ReadSource::Volatile));

            clock.advance(Duration::from_millis(before_ms));
            let stale = cache.lookup(&id).await?.map(|r| r.source());
            assert_eq!(stale, Some(ReadSource::Persistent));
            assert_eq!(cache.stats().expirations, 1);
            Ok::<_, PantryError>(())
        }).unwrap();
    }
}

// ============================================================================
// INDEX PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Property: popularity equals the number of successful writes of an id.
    #[test]
    fn prop_popularity_counts_writes(writes in 1u64..6) {
        let clock = ManualClock::starting_now();
        let mut cache = cache_with(EngineConfig::default(), &clock);

        let ranked = runtime().block_on(async {
            for _ in 0..writes {
                cache.set(fixtures::basil_pesto()).await?;
            }
            cache.popular(None, None).await
        }).unwrap();

        prop_assert_eq!(ranked.len(), 1);
        prop_assert_eq!(ranked[0].popularity_score, writes);
    }

    /// Property: every search hit has an ingredient containing a query term,
    /// and results never exceed the configured limit.
    #[test]
    fn prop_search_hits_match_query(
        drafts in arb_distinct_drafts(30),
        query in prop::sample::select(vec!["tom", "rice", "chi", "o", "basil leek"]),
    ) {
        let clock = ManualClock::starting_now();
        let mut cache = cache_with(EngineConfig::default().with_search_result_limit(10), &clock);

        let results = runtime().block_on(async {
            for draft in drafts {
                cache.set(draft).await?;
            }
            cache.search(Some(query), SearchFilters::default()).await
        }).unwrap();

        prop_assert!(results.total <= 10);
        prop_assert_eq!(results.total, results.recipes.len());
        let terms: Vec<&str> = query.split_whitespace().collect();
        for recipe in &results.recipes {
            let matched = recipe
                .ingredient_keys()
                .any(|key| terms.iter().any(|t| key.contains(t)));
            prop_assert!(matched, "{} does not match {:?}", recipe.id, query);
        }
    }

    /// Property: similar never returns the seed and respects the limit.
    #[test]
    fn prop_similar_excludes_seed(drafts in arb_distinct_drafts(20), limit in 1usize..6) {
        let clock = ManualClock::starting_now();
        let mut cache = cache_with(EngineConfig::default(), &clock);
        let seed = RecipeId::from("recipe_0");

        let similar = runtime().block_on(async {
            for draft in drafts {
                cache.set(draft).await?;
            }
            cache.similar(&seed, Some(limit)).await
        }).unwrap();

        prop_assert!(similar.len() <= limit);
        prop_assert!(similar.iter().all(|r| r.id != seed));
    }
}
