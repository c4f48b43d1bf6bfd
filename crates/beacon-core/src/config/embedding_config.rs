use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider: "api" or "tfidf".
    pub provider: String,
    /// Model name sent to the API provider.
    pub model: String,
    /// API endpoint.
    pub endpoint: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Embedding dimensions.
    pub dimensions: usize,
    /// Records per batch.
    pub batch_size: usize,
    /// Delay between the starts of consecutive calls within a batch.
    pub stagger_ms: u64,
    /// Delay between batches.
    pub batch_delay_ms: u64,
    /// Retries per individual embedding call.
    pub max_retries: u32,
    /// Query embedding cache time-to-live.
    pub query_cache_ttl_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: defaults::DEFAULT_EMBEDDING_ENDPOINT.to_string(),
            api_key_env: defaults::DEFAULT_EMBEDDING_API_KEY_ENV.to_string(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            batch_size: defaults::DEFAULT_EMBEDDING_BATCH_SIZE,
            stagger_ms: defaults::DEFAULT_EMBEDDING_STAGGER_MS,
            batch_delay_ms: defaults::DEFAULT_EMBEDDING_BATCH_DELAY_MS,
            max_retries: defaults::DEFAULT_EMBEDDING_MAX_RETRIES,
            query_cache_ttl_secs: defaults::DEFAULT_QUERY_CACHE_TTL_SECS,
        }
    }
}

impl EmbeddingConfig {
    /// Cache TTL as a chrono duration, saturating at the largest
    /// representable value.
    pub fn query_cache_ttl(&self) -> chrono::Duration {
        let secs = i64::try_from(self.query_cache_ttl_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1_000);
        chrono::Duration::seconds(secs)
    }
}
