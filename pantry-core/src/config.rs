//! Engine configuration
//!
//! Loaded from environment variables with defaults matching the behaviour
//! collaborators rely on (1000-entry cache, 24 hour TTL, 20 search results).

use std::time::Duration;

use crate::{ConfigError, PantryResult};

/// Default number of recipes held in the volatile cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
/// Default volatile cache entry lifetime (24 hours).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
/// Default cap on hydrated search results.
pub const DEFAULT_SEARCH_RESULT_LIMIT: usize = 20;
/// Default `by_season` limit.
pub const DEFAULT_SEASON_LIMIT: usize = 10;
/// Default `similar` limit.
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;
/// Default `popular` limit.
pub const DEFAULT_POPULAR_LIMIT: usize = 10;
/// Default depth of each store actor's command queue.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Configuration for one recipe cache instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum entries in the volatile cache before FIFO eviction.
    pub cache_capacity: usize,
    /// Age at which a volatile cache entry is discarded on read.
    pub cache_ttl: Duration,
    /// Maximum candidates hydrated by a search.
    pub search_result_limit: usize,
    /// Limit used by `by_season` when the caller gives none.
    pub default_season_limit: usize,
    /// Limit used by `similar` when the caller gives none.
    pub default_similar_limit: usize,
    /// Limit used by `popular` when the caller gives none.
    pub default_popular_limit: usize,
    /// Bounded mailbox size of the store actor.
    pub mailbox_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            search_result_limit: DEFAULT_SEARCH_RESULT_LIMIT,
            default_season_limit: DEFAULT_SEASON_LIMIT,
            default_similar_limit: DEFAULT_SIMILAR_LIMIT,
            default_popular_limit: DEFAULT_POPULAR_LIMIT,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create EngineConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PANTRY_CACHE_CAPACITY`: Volatile cache capacity (default: 1000)
    /// - `PANTRY_CACHE_TTL_SECS`: Volatile cache TTL in seconds (default: 86400)
    /// - `PANTRY_SEARCH_RESULT_LIMIT`: Max search results (default: 20)
    /// - `PANTRY_SEASON_LIMIT`: Default seasonal limit (default: 10)
    /// - `PANTRY_SIMILAR_LIMIT`: Default similar limit (default: 5)
    /// - `PANTRY_POPULAR_LIMIT`: Default popular limit (default: 10)
    /// - `PANTRY_MAILBOX_CAPACITY`: Actor mailbox depth (default: 256)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &str, fallback: usize| -> usize {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            cache_capacity: parse("PANTRY_CACHE_CAPACITY", defaults.cache_capacity),
            cache_ttl: Duration::from_secs(
                lookup("PANTRY_CACHE_TTL_SECS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
            search_result_limit: parse("PANTRY_SEARCH_RESULT_LIMIT", defaults.search_result_limit),
            default_season_limit: parse("PANTRY_SEASON_LIMIT", defaults.default_season_limit),
            default_similar_limit: parse("PANTRY_SIMILAR_LIMIT", defaults.default_similar_limit),
            default_popular_limit: parse("PANTRY_POPULAR_LIMIT", defaults.default_popular_limit),
            mailbox_capacity: parse("PANTRY_MAILBOX_CAPACITY", defaults.mailbox_capacity),
        }
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_search_result_limit(mut self, limit: usize) -> Self {
        self.search_result_limit = limit;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Reject zero capacities, a zero TTL, and zero limits.
    pub fn validate(&self) -> PantryResult<()> {
        let positive = [
            ("cache_capacity", self.cache_capacity),
            ("search_result_limit", self.search_result_limit),
            ("default_season_limit", self.default_season_limit),
            ("default_similar_limit", self.default_similar_limit),
            ("default_popular_limit", self.default_popular_limit),
            ("mailbox_capacity", self.mailbox_capacity),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "must be greater than zero".to_string(),
                }
                .into());
            }
        }
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "cache_ttl".to_string(),
                value: "0s".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(config.search_result_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, &str> = [
            ("PANTRY_CACHE_CAPACITY", "50"),
            ("PANTRY_CACHE_TTL_SECS", "60"),
            ("PANTRY_SEARCH_RESULT_LIMIT", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.search_result_limit, DEFAULT_SEARCH_RESULT_LIMIT);
        assert_eq!(config.default_similar_limit, DEFAULT_SIMILAR_LIMIT);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = EngineConfig::new().with_cache_capacity(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache_capacity"));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = EngineConfig::new().with_cache_ttl(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
