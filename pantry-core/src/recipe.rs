//! Recipe schema
//!
//! A recipe arrives from the generation service as a [`RecipeDraft`] (the id
//! is optional) and is stored as a [`Recipe`] once the store has assigned an
//! id and stamped `cached_at`. Only `cuisine`, `dietary_info`, `seasonal`, and
//! `ingredients` feed the index; each is optional and indexed only if present.

use serde::{Deserialize, Serialize};

use crate::{PantryResult, RecipeId, Timestamp, ValidationError};

/// Keys `Recipe` serializes itself; never carried in `RecipeDetails::extra`.
const RESERVED_KEYS: &[&str] = &["id", "cached_at"];

/// Amount of an ingredient.
///
/// Model output mixes numeric amounts (`1`, `0.5`) with free text (`"1/2"`,
/// `"a pinch"`), so both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Amount(f64),
    Text(String),
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Ingredient {
    /// Ingredient with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            unit: None,
            category: None,
        }
    }

    /// Key under which this ingredient is indexed.
    pub fn index_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Per-serving nutrition facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
}

/// Every recipe field except the identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionFacts>,
    /// Dietary tags, e.g. "vegetarian".
    #[serde(default)]
    pub dietary_info: Vec<String>,
    /// Seasonal tags, e.g. "spring".
    #[serde(default)]
    pub seasonal: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Fields the schema does not name (`generated_from`, `raw_response`, ...),
    /// kept so that stored recipes round-trip unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RecipeDetails {
    /// Details with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Recipe as submitted for storage; the id is assigned if absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecipeId>,
    #[serde(flatten)]
    pub details: RecipeDetails,
}

impl RecipeDraft {
    pub fn new(details: RecipeDetails) -> Self {
        Self { id: None, details }
    }

    pub fn with_id(id: impl Into<RecipeId>, details: RecipeDetails) -> Self {
        Self {
            id: Some(id.into()),
            details,
        }
    }

    /// Check the draft before it is persisted.
    ///
    /// A supplied id must not be blank, and every ingredient needs a name
    /// because ingredient names become index keys.
    pub fn validate(&self) -> PantryResult<()> {
        if let Some(id) = &self.id {
            if id.is_blank() {
                return Err(ValidationError::InvalidValue {
                    field: "id".to_string(),
                    reason: "must not be blank".to_string(),
                }
                .into());
            }
        }
        if let Some(pos) = self
            .details
            .ingredients
            .iter()
            .position(|i| i.name.trim().is_empty())
        {
            return Err(ValidationError::RequiredFieldMissing {
                field: format!("ingredients[{}].name", pos),
            }
            .into());
        }
        Ok(())
    }

    /// Turn the draft into a stored recipe, keeping a supplied id or minting one.
    ///
    /// A `cached_at` left over from an earlier read is replaced by the new stamp.
    pub fn into_recipe(self, cached_at: Timestamp) -> Recipe {
        let mut details = self.details;
        for key in RESERVED_KEYS {
            details.extra.remove(*key);
        }
        Recipe {
            id: self.id.unwrap_or_else(RecipeId::generate),
            details,
            cached_at,
        }
    }
}

/// Recipe as held by the cache and the persistent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(flatten)]
    pub details: RecipeDetails,
    /// When the recipe was last written through the store.
    pub cached_at: Timestamp,
}

impl Recipe {
    /// Lowercased ingredient names, in list order.
    pub fn ingredient_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.details.ingredients.iter().map(Ingredient::index_key)
    }
}
