//! Top-level Beacon configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AnswerConfig, EmbeddingConfig, ObservabilityConfig, QueryConfig, RetrievalConfig, SyncConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`BEACON_*`)
/// 2. Config file (`beacon.toml`)
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub sync: SyncConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub answer: AnswerConfig,
    pub query: QueryConfig,
    pub observability: ObservabilityConfig,
}

impl BeaconConfig {
    /// Load configuration from an optional TOML file, then apply `BEACON_*`
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BEACON_SOURCE_URL") {
            self.sync.source_url = Some(url);
        }
        if let Some(provider) = lookup("BEACON_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Some(model) = lookup("BEACON_GENERATION_MODEL") {
            self.answer.model = model;
        }
        if let Some(raw) = lookup("BEACON_SIMILARITY_THRESHOLD") {
            self.retrieval.similarity_threshold =
                parse_override("retrieval.similarity_threshold", &raw)?;
        }
        if let Some(raw) = lookup("BEACON_TOP_K") {
            self.retrieval.top_k = parse_override("retrieval.top_k", &raw)?;
        }
        if let Some(raw) = lookup("BEACON_EMBEDDING_BATCH_SIZE") {
            self.embedding.batch_size = parse_override("embedding.batch_size", &raw)?;
        }
        if let Some(level) = lookup("BEACON_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.retrieval.similarity_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(invalid(
                "retrieval.similarity_threshold",
                "must be between -1.0 and 1.0",
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(invalid("retrieval.top_k", "must be greater than 0"));
        }
        if self.embedding.batch_size == 0 {
            return Err(invalid("embedding.batch_size", "must be greater than 0"));
        }
        if self.embedding.dimensions == 0 {
            return Err(invalid("embedding.dimensions", "must be greater than 0"));
        }
        if self.embedding.query_cache_ttl_secs == 0 {
            return Err(invalid(
                "embedding.query_cache_ttl_secs",
                "must be greater than 0",
            ));
        }
        if self.query.max_page_size == 0 {
            return Err(invalid("query.max_page_size", "must be greater than 0"));
        }
        if self.query.default_page_size == 0
            || self.query.default_page_size > self.query.max_page_size
        {
            return Err(invalid(
                "query.default_page_size",
                "must be between 1 and query.max_page_size",
            ));
        }
        if self.answer.max_question_chars == 0 {
            return Err(invalid("answer.max_question_chars", "must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn parse_override<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::ValidationFailed {
        field: field.to_string(),
        message: format!("cannot parse override value `{raw}`"),
    })
}
