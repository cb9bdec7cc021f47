//! Pantry Core - Recipe Types
//!
//! Pure data structures shared by the storage and engine crates: the recipe
//! schema, query/result shapes, the error taxonomy, configuration, and the
//! clock used for cache expiry. No I/O lives here.

pub mod clock;
pub mod config;
pub mod enums;
pub mod error;
pub mod identity;
pub mod query;
pub mod recipe;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use enums::{ErrorKind, Season, SeasonParseError};
pub use error::{ConfigError, PantryError, PantryResult, StorageError, ValidationError};
pub use identity::{RecipeId, Timestamp};
pub use query::{RankedRecipe, SearchFilters, SearchResults, SetOutcome};
pub use recipe::{Ingredient, NutritionFacts, Quantity, Recipe, RecipeDetails, RecipeDraft};
