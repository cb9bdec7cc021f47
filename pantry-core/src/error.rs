//! Error types for pantry operations

use crate::{ErrorKind, RecipeId};
use thiserror::Error;

/// Persistent store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },

    #[error("Serialization failed for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all pantry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PantryError {
    #[error("Recipe not found: {id}")]
    NotFound { id: RecipeId },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Recipe cache '{name}' is not running")]
    ActorUnavailable { name: String },
}

impl PantryError {
    pub fn not_found(id: &RecipeId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    /// Failure class as seen by collaborators.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PantryError::NotFound { .. } => ErrorKind::NotFound,
            PantryError::Validation(_) | PantryError::Config(_) => ErrorKind::InvalidInput,
            PantryError::Storage(_) | PantryError::ActorUnavailable { .. } => {
                ErrorKind::StorageFailure
            }
        }
    }
}

/// Result type alias for pantry operations.
pub type PantryResult<T> = Result<T, PantryError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = PantryError::not_found(&RecipeId::from("recipe_7"));
        let msg = format!("{}", err);
        assert!(msg.contains("Recipe not found"));
        assert!(msg.contains("recipe_7"));
    }

    #[test]
    fn test_storage_error_display_write_rejected() {
        let err = StorageError::WriteRejected {
            key: "recipe_index".to_string(),
            reason: "disk full".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("recipe_index"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            PantryError::not_found(&RecipeId::from("x")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            PantryError::from(ValidationError::RequiredFieldMissing {
                field: "q".to_string()
            })
            .kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            PantryError::from(StorageError::LockPoisoned).kind(),
            ErrorKind::StorageFailure
        );
        assert_eq!(
            PantryError::ActorUnavailable {
                name: "global".to_string()
            }
            .kind(),
            ErrorKind::StorageFailure
        );
    }

    #[test]
    fn test_from_variants() {
        let storage = PantryError::from(StorageError::Unavailable {
            reason: "offline".to_string(),
        });
        assert!(matches!(storage, PantryError::Storage(_)));

        let config = PantryError::from(ConfigError::InvalidValue {
            field: "cache_capacity".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
        assert!(matches!(config, PantryError::Config(_)));
    }
}
