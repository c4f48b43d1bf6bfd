//! EmbeddingGenerator: per-record failure isolation, batching, staggering,
//! dimension checks.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::errors::{BeaconError, BeaconResult, EmbeddingError};
use beacon_core::models::{Record, RecordDraft, RecordId};
use beacon_core::traits::IEmbeddingProvider;
use beacon_embeddings::{embedding_text, EmbeddingGenerator, EmbeddingIndex, TfIdfEmbeddingProvider};
use chrono::Utc;
use tokio::time::Instant;

/// Fails for any text containing `poison`; records start instants.
struct ScriptedProvider {
    poison: Option<String>,
    dims: usize,
    wrong_dims_for: Option<String>,
    calls: AtomicUsize,
    starts: Mutex<Vec<Instant>>,
}

impl ScriptedProvider {
    fn new(poison: Option<&str>) -> Arc<Self> {
        Arc::new(Self::build(poison, None))
    }

    fn with_wrong_dims_for(marker: &str) -> Arc<Self> {
        Arc::new(Self::build(None, Some(marker)))
    }

    fn build(poison: Option<&str>, wrong_dims_for: Option<&str>) -> Self {
        Self {
            poison: poison.map(String::from),
            dims: 4,
            wrong_dims_for: wrong_dims_for.map(String::from),
            calls: AtomicUsize::new(0),
            starts: Mutex::new(Vec::new()),
        }
    }

    /// Start offsets in ms relative to `origin`.
    fn start_offsets(&self, origin: Instant) -> Vec<u128> {
        self.starts
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.duration_since(origin).as_millis())
            .collect()
    }
}

/// Paused-clock timers fire on millisecond ticks; allow a few ticks of slack.
fn assert_offsets(actual: &[u128], expected: &[u128]) {
    assert_eq!(actual.len(), expected.len(), "offsets {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!(*a >= *e && *a <= *e + 5, "offsets {actual:?} expected {expected:?}");
    }
}

#[async_trait]
impl IEmbeddingProvider for ScriptedProvider {
    async fn embed(&self, text: &str) -> BeaconResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.starts.lock().unwrap().push(Instant::now());
        if self.poison.as_deref().is_some_and(|p| text.contains(p)) {
            return Err(EmbeddingError::CallFailed {
                reason: "upstream 500".into(),
            }
            .into());
        }
        if self.wrong_dims_for.as_deref().is_some_and(|p| text.contains(p)) {
            return Ok(vec![1.0; self.dims + 1]);
        }
        Ok(vec![1.0, 0.0, 0.0, text.len() as f32])
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let draft = RecordDraft {
                external_id: format!("ext-{i}"),
                name: format!("Record {i}"),
                summary: format!("summary {i}"),
                ..Default::default()
            };
            Record::from_draft(RecordId(i as u64 + 1), draft, Utc::now())
        })
        .collect()
}

fn instant_generator(provider: Arc<ScriptedProvider>, batch_size: usize) -> EmbeddingGenerator {
    EmbeddingGenerator::with_timing(provider, batch_size, Duration::ZERO, Duration::ZERO)
}

#[tokio::test]
async fn one_forced_failure_yields_n_minus_one() {
    let provider = ScriptedProvider::new(Some("Record 7 "));
    let generator = instant_generator(provider.clone(), 20);
    let input = records(25);

    let embedded = generator.embed_all(&input).await;

    assert_eq!(embedded.len(), 24);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 25);
    let ids: HashSet<_> = embedded.iter().map(|(r, _)| r.id).collect();
    assert!(!ids.contains(&RecordId(8)));
}

#[tokio::test]
async fn results_keep_input_order() {
    let generator = instant_generator(ScriptedProvider::new(None), 3);
    let input = records(10);
    let embedded = generator.embed_all(&input).await;
    let ids: Vec<_> = embedded.iter().map(|(r, _)| r.id.0).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn wrong_dimension_is_a_per_item_failure() {
    let generator = instant_generator(ScriptedProvider::with_wrong_dims_for("Record 2 "), 20);

    let err = generator
        .embed_text("Record 2 | summary 2")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BeaconError::Embedding(EmbeddingError::DimensionMismatch { expected: 4, actual: 5 })
    ));

    let embedded = generator.embed_all(&records(4)).await;
    assert_eq!(embedded.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn calls_within_a_batch_are_staggered() {
    let provider = ScriptedProvider::new(None);
    let generator = EmbeddingGenerator::with_timing(
        provider.clone(),
        4,
        Duration::from_millis(50),
        Duration::from_millis(250),
    );
    let started = Instant::now();

    generator.embed_all(&records(4)).await;

    assert_offsets(&provider.start_offsets(started), &[0, 50, 100, 150]);
}

#[tokio::test(start_paused = true)]
async fn batches_are_separated_by_the_batch_delay() {
    let provider = ScriptedProvider::new(None);
    let generator = EmbeddingGenerator::with_timing(
        provider.clone(),
        2,
        Duration::from_millis(10),
        Duration::from_millis(250),
    );
    let started = Instant::now();

    generator.embed_all(&records(5)).await;

    // batch 1: 0, 10 | delay 250 | batch 2: 260, 270 | delay 250 | batch 3: 520
    assert_offsets(&provider.start_offsets(started), &[0, 10, 260, 270, 520]);
}

#[tokio::test]
async fn index_from_a_pass_tracks_text_hashes() {
    let provider = Arc::new(TfIdfEmbeddingProvider::new(64));
    let generator = EmbeddingGenerator::with_timing(provider, 20, Duration::ZERO, Duration::ZERO);
    let input = records(3);

    let embedded = generator.embed_all(&input).await;
    let index = EmbeddingIndex::build(embedded, generator.dimensions(), Utc::now(), 1);

    assert_eq!(index.len(), 3);
    assert!(index.stale_ids(&input).is_empty());
    assert_eq!(
        index.get(RecordId(1)).unwrap().text_hash,
        beacon_embeddings::text_hash(&embedding_text(&input[0]))
    );
}
