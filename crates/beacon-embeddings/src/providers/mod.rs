//! Embedding providers and selection by configured name.
//!
//! - `api`: OpenAI-compatible HTTP API
//! - `tfidf`: local hashing provider, always available

pub mod api_provider;
pub mod tfidf_provider;

use std::sync::Arc;

pub use api_provider::ApiEmbeddingProvider;
pub use tfidf_provider::TfIdfEmbeddingProvider;

use beacon_core::config::EmbeddingConfig;
use beacon_core::traits::IEmbeddingProvider;
use tracing::{info, warn};

/// Create the configured provider. Falls back to TF-IDF when the API provider
/// cannot be set up or the name is unknown.
pub fn create_provider(config: &EmbeddingConfig) -> Arc<dyn IEmbeddingProvider> {
    match config.provider.as_str() {
        "api" | "openai" => match ApiEmbeddingProvider::from_config(config) {
            Ok(p) => {
                info!(provider = "api", model = %config.model, dims = config.dimensions, "embedding provider configured");
                Arc::new(p)
            }
            Err(e) => {
                warn!(error = %e, "API embedding provider unavailable, falling back to TF-IDF");
                Arc::new(TfIdfEmbeddingProvider::new(config.dimensions))
            }
        },
        "tfidf" => {
            info!(provider = "tfidf", dims = config.dimensions, "using TF-IDF embedding provider");
            Arc::new(TfIdfEmbeddingProvider::new(config.dimensions))
        }
        other => {
            warn!(provider = other, "unknown embedding provider, using TF-IDF");
            Arc::new(TfIdfEmbeddingProvider::new(config.dimensions))
        }
    }
}
