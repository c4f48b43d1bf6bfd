//! EmbeddingGenerator: batched, staggered vectorization of records.

use std::sync::Arc;
use std::time::{Duration, Instant};

use beacon_core::config::EmbeddingConfig;
use beacon_core::errors::{BeaconResult, EmbeddingError};
use beacon_core::models::Record;
use beacon_core::traits::IEmbeddingProvider;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::text::embedding_text;

pub struct EmbeddingGenerator {
    provider: Arc<dyn IEmbeddingProvider>,
    batch_size: usize,
    stagger: Duration,
    batch_delay: Duration,
}

impl EmbeddingGenerator {
    pub fn new(provider: Arc<dyn IEmbeddingProvider>, config: &EmbeddingConfig) -> Self {
        Self::with_timing(
            provider,
            config.batch_size,
            Duration::from_millis(config.stagger_ms),
            Duration::from_millis(config.batch_delay_ms),
        )
    }

    /// Explicit batching parameters. A zero batch size is treated as one.
    pub fn with_timing(
        provider: Arc<dyn IEmbeddingProvider>,
        batch_size: usize,
        stagger: Duration,
        batch_delay: Duration,
    ) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
            stagger,
            batch_delay,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    /// Embed one text. The vector must have the provider's declared dimension.
    pub async fn embed_text(&self, text: &str) -> BeaconResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText.into());
        }
        let vector = self.provider.embed(text).await?;
        let expected = self.provider.dimensions();
        if vector.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }
            .into());
        }
        Ok(vector)
    }

    /// Embed every record, in input order.
    ///
    /// Records are processed in batches of `batch_size`. Within a batch the
    /// calls run concurrently, the i-th one starting `stagger * i` after the
    /// first; batches are separated by `batch_delay`. A record whose call
    /// fails is logged and left out of the result.
    pub async fn embed_all(&self, records: &[Record]) -> Vec<(Record, Vec<f32>)> {
        let started = Instant::now();
        let mut embedded = Vec::with_capacity(records.len());
        let mut failed = 0usize;
        let batches = records.len().div_ceil(self.batch_size);

        for (batch_idx, batch) in records.chunks(self.batch_size).enumerate() {
            if batch_idx > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            let calls = batch.iter().enumerate().map(|(i, record)| {
                let delay = self.stagger * i as u32;
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let text = embedding_text(record);
                    (record, self.embed_text(&text).await)
                }
            });

            for (record, result) in join_all(calls).await {
                match result {
                    Ok(vector) => embedded.push((record.clone(), vector)),
                    Err(e) => {
                        failed += 1;
                        warn!(
                            record_id = %record.id,
                            provider = self.provider.name(),
                            error = %e,
                            "record embedding failed, omitted from index"
                        );
                    }
                }
            }
            debug!(batch = batch_idx + 1, batches, "embedding batch complete");
        }

        info!(
            requested = records.len(),
            embedded = embedded.len(),
            failed,
            provider = self.provider.name(),
            duration_ms = started.elapsed().as_millis() as u64,
            "embedding pass complete"
        );
        embedded
    }
}
