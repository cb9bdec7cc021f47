//! Free-text search over the ingredient facet.
//!
//! # Matching rule
//!
//! The query is lowercased and split on whitespace into terms. A term matches
//! an ingredient key when the key *contains* the term, so `tom` matches
//! `tomato` and `cherry tomato`. Every id under every matching key joins the
//! candidate set, in the order keys and ids were first indexed.
//!
//! An empty or whitespace-only query has no terms and therefore no
//! candidates. Filters only narrow a candidate set; they never produce one.
//!
//! # Filters
//!
//! Each present filter intersects the candidates with its facet list. A
//! filter naming a facet value the index has never seen is ignored rather
//! than treated as "nothing matches".

use pantry_core::{RecipeId, SearchFilters};
use pantry_storage::IndexRecord;

use crate::candidates::CandidateSet;

/// Split a query into lowercase search terms.
pub fn terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Whether an ingredient key matches a search term.
pub fn term_matches(ingredient_key: &str, term: &str) -> bool {
    ingredient_key.contains(term)
}

/// Resolves queries and filters into candidate ids.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine {
    result_limit: usize,
}

impl SearchEngine {
    pub fn new(result_limit: usize) -> Self {
        Self { result_limit }
    }

    /// Candidate ids for `query` narrowed by `filters`, at most `result_limit`.
    pub fn candidates(
        &self,
        index: &IndexRecord,
        query: &str,
        filters: &SearchFilters,
    ) -> Vec<RecipeId> {
        let mut candidates = CandidateSet::new();
        for term in terms(query) {
            for (key, ids) in index.ingredients() {
                if term_matches(key, &term) {
                    candidates.extend(ids);
                }
            }
        }

        narrow(&mut candidates, filters.cuisine.as_deref(), |v| index.cuisine(v));
        narrow(&mut candidates, filters.diet.as_deref(), |v| index.diet(v));
        narrow(&mut candidates, filters.season.as_deref(), |v| index.season(v));

        candidates.take(self.result_limit)
    }
}

fn narrow<'a, F>(candidates: &mut CandidateSet, value: Option<&str>, facet: F)
where
    F: Fn(&str) -> Option<&'a [RecipeId]>,
{
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return;
    };
    if let Some(ids) = facet(value) {
        candidates.retain_in(ids);
    }
}
