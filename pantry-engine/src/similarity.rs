//! Related-recipe lookup by shared facets.

use pantry_core::{Recipe, RecipeId};
use pantry_storage::IndexRecord;

use crate::candidates::CandidateSet;

/// Finds recipes sharing an ingredient or the cuisine of a seed recipe.
///
/// There is no scoring. Ids are collected ingredient by ingredient in the
/// seed's list order, then from the seed's cuisine, and the first `limit`
/// distinct ids win. Sharing several facets does not move an id forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine;

impl SimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn candidates(&self, index: &IndexRecord, seed: &Recipe, limit: usize) -> Vec<RecipeId> {
        let mut candidates = CandidateSet::new();

        for key in seed.ingredient_keys() {
            if let Some(ids) = index.ingredient(&key) {
                candidates.extend(ids);
            }
        }
        if let Some(ids) = seed.details.cuisine.as_deref().and_then(|c| index.cuisine(c)) {
            candidates.extend(ids);
        }

        candidates.remove(&seed.id);
        candidates.take(limit)
    }
}
