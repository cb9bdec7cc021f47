//! Enum types for pantry

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Timestamp;

// ============================================================================
// SEASONS
// ============================================================================

/// Meteorological season (northern hemisphere).
///
/// Seasonal tags on recipes are free-form strings; this enum names the four
/// values the index is normally queried with and supplies the default season
/// when a caller does not pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Season for a zero-based month (0 = January).
    pub fn for_month(month0: u32) -> Self {
        match month0 {
            2..=4 => Season::Spring,
            5..=7 => Season::Summer,
            8..=10 => Season::Fall,
            _ => Season::Winter,
        }
    }

    /// Season containing the given instant.
    pub fn at(ts: Timestamp) -> Self {
        Self::for_month(ts.month0())
    }

    /// Tag string used in the season facet.
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            _ => Err(SeasonParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid season string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonParseError(pub String);

impl fmt::Display for SeasonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid season: {}", self.0)
    }
}

impl std::error::Error for SeasonParseError {}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// Coarse failure class reported to collaborators.
///
/// None of these are retried inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown recipe id.
    NotFound,
    /// Missing or malformed request field.
    InvalidInput,
    /// Persistent store unavailable or write rejected.
    StorageFailure,
}
