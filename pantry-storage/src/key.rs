//! Persistent store key layout.
//!
//! Every recipe lives under `recipe:<id>`; the aggregate index lives under a
//! single `recipe_index` key. [`StoreKey`] is the only way store code builds
//! keys, so the two namespaces cannot collide.

use std::fmt;

use pantry_core::RecipeId;

const RECIPE_PREFIX: &str = "recipe:";
const INDEX_KEY: &str = "recipe_index";

/// Key in the persistent store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// A stored recipe.
    Recipe(RecipeId),
    /// The aggregate facet index.
    Index,
}

impl StoreKey {
    pub fn recipe(id: &RecipeId) -> Self {
        StoreKey::Recipe(id.clone())
    }

    /// Encode to the byte form used by the backends.
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKey::Recipe(id) => write!(f, "{}{}", RECIPE_PREFIX, id),
            StoreKey::Index => f.write_str(INDEX_KEY),
        }
    }
}
