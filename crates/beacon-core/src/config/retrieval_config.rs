use serde::{Deserialize, Serialize};

use super::defaults;

/// Similarity ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity for a record to count as relevant.
    pub similarity_threshold: f64,
    /// Records passed to the answer composer.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            top_k: defaults::DEFAULT_TOP_K,
        }
    }
}
