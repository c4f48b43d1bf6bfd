//! OpenAI-compatible embedding API provider.
//!
//! One HTTP call per text with retry and exponential backoff. An
//! authentication rejection marks the provider unavailable until
//! `reset_availability` is called; other failures only fail the call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::config::EmbeddingConfig;
use beacon_core::errors::{BeaconResult, EmbeddingError};
use beacon_core::traits::IEmbeddingProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const INITIAL_BACKOFF_MS: u64 = 100;

pub struct ApiEmbeddingProvider {
    client: reqwest::Client,
    model: String,
    endpoint: String,
    api_key: String,
    dimensions: usize,
    max_retries: u32,
    available: AtomicBool,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// Outcome of a single attempt: whether retrying could help.
enum AttemptError {
    Transient(String),
    Permanent(EmbeddingError),
}

impl ApiEmbeddingProvider {
    pub fn new(
        model: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        dimensions: usize,
        max_retries: u32,
    ) -> BeaconResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .build()
            .map_err(|e| EmbeddingError::CallFailed {
                reason: format!("client setup failed: {e}"),
            })?;
        Ok(Self {
            client,
            model: model.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            dimensions,
            max_retries,
            available: AtomicBool::new(true),
        })
    }

    /// Build from `[embedding]` config, reading the key from `api_key_env`.
    pub fn from_config(config: &EmbeddingConfig) -> BeaconResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EmbeddingError::ProviderUnavailable {
                provider: format!("api (no key in ${})", config.api_key_env),
            })?;
        Self::new(
            config.model.clone(),
            config.endpoint.clone(),
            api_key,
            config.dimensions,
            config.max_retries,
        )
    }

    /// Re-enable after an authentication failure (e.g. a rotated key).
    pub fn reset_availability(&self) {
        self.available.store(true, Ordering::Relaxed);
    }

    async fn attempt(&self, text: &str) -> Result<Vec<f32>, AttemptError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
                dimensions: self.dimensions,
            })
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("HTTP error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = format!("API returned {status}: {body}");
            return Err(match status.as_u16() {
                401 | 403 => {
                    self.available.store(false, Ordering::Relaxed);
                    AttemptError::Permanent(EmbeddingError::ProviderUnavailable {
                        provider: format!("{}: {reason}", self.model),
                    })
                }
                400 | 404 | 422 => {
                    AttemptError::Permanent(EmbeddingError::CallFailed { reason })
                }
                _ => AttemptError::Transient(reason),
            });
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Transient(format!("JSON parse error: {e}")))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                AttemptError::Permanent(EmbeddingError::CallFailed {
                    reason: "empty response".to_string(),
                })
            })
    }
}

#[async_trait]
impl IEmbeddingProvider for ApiEmbeddingProvider {
    async fn embed(&self, text: &str) -> BeaconResult<Vec<f32>> {
        if !self.is_available() {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: self.model.clone(),
            }
            .into());
        }

        let mut last_reason = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1));
                debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying embedding request");
                tokio::time::sleep(delay).await;
            }
            match self.attempt(text).await {
                Ok(vector) => return Ok(vector),
                Err(AttemptError::Permanent(e)) => return Err(e.into()),
                Err(AttemptError::Transient(reason)) => {
                    warn!(attempt, error = %reason, "embedding request failed");
                    last_reason = reason;
                }
            }
        }

        Err(EmbeddingError::CallFailed {
            reason: format!("{} retries exhausted: {last_reason}", self.max_retries),
        }
        .into())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}
