//! Request and response shapes for the recipe cache operations.

use serde::{Deserialize, Serialize};

use crate::{Recipe, RecipeId};

/// Optional facet filters applied to a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn diet(mut self, diet: impl Into<String>) -> Self {
        self.diet = Some(diet.into());
        self
    }

    pub fn season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cuisine.is_none() && self.diet.is_none() && self.season.is_none()
    }
}

/// Result of a search: the hydrated recipes plus the request echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub recipes: Vec<Recipe>,
    /// Number of hydrated recipes (not the candidate count).
    pub total: usize,
    pub query: String,
    pub filters: SearchFilters,
}

impl SearchResults {
    pub fn new(recipes: Vec<Recipe>, query: impl Into<String>, filters: SearchFilters) -> Self {
        Self {
            total: recipes.len(),
            recipes,
            query: query.into(),
            filters,
        }
    }
}

/// Recipe annotated with its current popularity counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub popularity_score: u64,
}

/// Acknowledgement of a successful `set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOutcome {
    #[serde(rename = "recipe_id")]
    pub id: RecipeId,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_builder() {
        let filters = SearchFilters::new().cuisine("Italian").season("summer");
        assert_eq!(filters.cuisine.as_deref(), Some("Italian"));
        assert!(filters.diet.is_none());
        assert!(!filters.is_empty());
        assert!(SearchFilters::default().is_empty());
    }

    #[test]
    fn test_total_counts_hydrated_recipes() {
        let results = SearchResults::new(Vec::new(), "tom", SearchFilters::default());
        assert_eq!(results.total, 0);
        assert_eq!(results.query, "tom");
    }

    #[test]
    fn test_set_outcome_wire_name() {
        let outcome = SetOutcome {
            id: RecipeId::from("recipe_1"),
            success: true,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["recipe_id"], "recipe_1");
        assert_eq!(value["success"], true);
    }
}
