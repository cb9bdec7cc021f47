//! Seasonal and popular retrieval.

use pantry_core::RecipeId;
use pantry_storage::IndexRecord;

/// Reads the season facet and the popularity counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingService;

impl RankingService {
    pub fn new() -> Self {
        Self
    }

    /// The first `limit` ids tagged with `season`, in indexing order.
    pub fn by_season(&self, index: &IndexRecord, season: &str, limit: usize) -> Vec<RecipeId> {
        index
            .season(season)
            .unwrap_or_default()
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Ids with their popularity counters.
    ///
    /// When `category` names a known cuisine, this is that cuisine's id list
    /// in indexing order and the counters play no part in the ordering.
    /// Otherwise every known id is ranked by counter, highest first.
    pub fn popular(
        &self,
        index: &IndexRecord,
        category: Option<&str>,
        limit: usize,
    ) -> Vec<(RecipeId, u64)> {
        if let Some(ids) = category.filter(|c| !c.is_empty()).and_then(|c| index.cuisine(c)) {
            return ids
                .iter()
                .take(limit)
                .map(|id| (id.clone(), index.popularity(id)))
                .collect();
        }

        let mut ranking = index.popularity_ranking();
        ranking.truncate(limit);
        ranking
    }
}
