//! SimilarityRanker: threshold filter with full-set fallback, stable
//! descending order, top-k.

use std::cmp::Ordering;

use beacon_core::config::RetrievalConfig;
use beacon_core::errors::RankingError;
use beacon_core::models::{EmbeddedRecord, RankedResult};
use tracing::debug;

use crate::similarity::checked_cosine_similarity;

#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker {
    threshold: f64,
    top_k: usize,
}

impl SimilarityRanker {
    pub fn new(threshold: f64, top_k: usize) -> Self {
        Self { threshold, top_k }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.similarity_threshold, config.top_k)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Configured default for `top_k`.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rank `embedded` against `query` and keep the best `top_k`.
    ///
    /// Records scoring at or above the threshold are kept; when none do, every
    /// record is kept so the caller still gets the closest matches. Equal
    /// scores keep their input order. Any record whose vector length differs
    /// from the query's fails the whole call.
    pub fn rank(
        &self,
        query: &[f32],
        embedded: &[EmbeddedRecord],
        top_k: usize,
    ) -> Result<Vec<RankedResult>, RankingError> {
        let mut scored = Vec::with_capacity(embedded.len());
        for entry in embedded {
            let score = checked_cosine_similarity(query, &entry.vector).ok_or(
                RankingError::DimensionMismatch {
                    record_id: entry.record.id.0,
                    query: query.len(),
                    record: entry.vector.len(),
                },
            )?;
            scored.push((entry, score));
        }

        let passing = scored.iter().filter(|(_, s)| *s >= self.threshold).count();
        if passing > 0 {
            scored.retain(|(_, s)| *s >= self.threshold);
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        debug!(
            candidates = embedded.len(),
            passing,
            fallback = passing == 0,
            returned = scored.len(),
            "ranking complete"
        );

        Ok(scored
            .into_iter()
            .map(|(entry, score)| RankedResult {
                record: entry.record.clone(),
                score,
            })
            .collect())
    }

    /// [`rank`](Self::rank) with the configured `top_k`.
    pub fn rank_default(
        &self,
        query: &[f32],
        embedded: &[EmbeddedRecord],
    ) -> Result<Vec<RankedResult>, RankingError> {
        self.rank(query, embedded, self.top_k)
    }
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}
