//! PortalPipeline: the orchestrator behind the portal's question and
//! listing paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use beacon_answer::{AnswerComposer, ChatApiProvider};
use beacon_core::cancellation::CancellationToken;
use beacon_core::clock::{Clock, SystemClock};
use beacon_core::config::BeaconConfig;
use beacon_core::errors::{BeaconResult, ValidationError};
use beacon_core::models::{
    Answer, AnswerFrame, QuestionPhase, RankedResult, Record, RecordId, UsageCounts, UsageKind,
};
use beacon_core::traits::{IContentSource, IEmbeddingProvider, IGenerationProvider};
use beacon_embeddings::{create_provider, EmbeddingGenerator, EmbeddingIndex, QueryEmbeddingCache};
use beacon_observability::tracing_setup::events;
use beacon_observability::{answer_span, embedding_span, ranking_span, reconcile_span};
use beacon_observability::{QuestionLog, QuestionLogEntry};
use beacon_query::{Page, ResourceFilter, ResourceQueryEngine};
use beacon_retrieval::SimilarityRanker;
use beacon_storage::RecordStore;
use beacon_sync::{ContentReconciler, HttpContentSource, ReconcileReport};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn, Instrument};

use crate::run::QuestionRun;

/// Clears the in-progress flag when a pass ends, and re-marks the index stale
/// if the pass was abandoned before publishing.
struct PassGuard<'a> {
    in_progress: &'a AtomicBool,
    needs_update: &'a AtomicBool,
    published: bool,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.needs_update.store(true, Ordering::Release);
        }
        self.in_progress.store(false, Ordering::Release);
    }
}

pub struct PortalPipeline {
    config: BeaconConfig,
    store: Arc<RecordStore>,
    reconciler: ContentReconciler,
    generator: Arc<EmbeddingGenerator>,
    query_cache: QueryEmbeddingCache,
    ranker: SimilarityRanker,
    composer: AnswerComposer,
    query_engine: ResourceQueryEngine,
    index: RwLock<Option<Arc<EmbeddingIndex>>>,
    needs_update: Arc<AtomicBool>,
    in_progress: AtomicBool,
    refresh_gate: tokio::sync::Mutex<()>,
    question_log: Mutex<QuestionLog>,
    clock: Arc<dyn Clock>,
}

impl PortalPipeline {
    pub fn new(
        config: BeaconConfig,
        source: Arc<dyn IContentSource>,
        embedder: Arc<dyn IEmbeddingProvider>,
        generation: Arc<dyn IGenerationProvider>,
    ) -> Self {
        Self::with_clock(config, source, embedder, generation, Arc::new(SystemClock))
    }

    /// Build with an injected clock, shared by the store and the query cache.
    pub fn with_clock(
        config: BeaconConfig,
        source: Arc<dyn IContentSource>,
        embedder: Arc<dyn IEmbeddingProvider>,
        generation: Arc<dyn IGenerationProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(RecordStore::with_clock(clock.clone()));
        let needs_update = Arc::new(AtomicBool::new(false));
        let reconciler = ContentReconciler::new(source, store.clone(), &config.sync)
            .with_stale_flag(needs_update.clone());
        let generator = Arc::new(EmbeddingGenerator::new(embedder, &config.embedding));
        let query_cache = QueryEmbeddingCache::new(
            generator.clone(),
            clock.clone(),
            config.embedding.query_cache_ttl(),
        );
        let ranker = SimilarityRanker::from_config(&config.retrieval);
        let composer = AnswerComposer::new(generation);
        let query_engine = ResourceQueryEngine::new(store.clone(), &config.query);
        let question_log = QuestionLog::with_capacity(config.observability.question_log_capacity);

        Self {
            config,
            store,
            reconciler,
            generator,
            query_cache,
            ranker,
            composer,
            query_engine,
            index: RwLock::new(None),
            needs_update,
            in_progress: AtomicBool::new(false),
            refresh_gate: tokio::sync::Mutex::new(()),
            question_log: Mutex::new(question_log),
            clock,
        }
    }

    /// Production wiring: HTTP content source, configured embedding provider,
    /// chat completions generation.
    pub fn from_config(config: BeaconConfig) -> BeaconResult<Self> {
        config.validate()?;
        let source = Arc::new(HttpContentSource::from_config(&config.sync)?);
        let embedder = create_provider(&config.embedding);
        let generation = Arc::new(ChatApiProvider::from_config(&config.answer)?);
        Ok(Self::new(config, source, embedder, generation))
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// The published index, if a pass has completed.
    pub fn index(&self) -> Option<Arc<EmbeddingIndex>> {
        self.index.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update.load(Ordering::Acquire)
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Mirror the content source into the store. Marks the index stale on
    /// success; a failure leaves both untouched.
    pub async fn sync(&self) -> BeaconResult<ReconcileReport> {
        let report = self
            .reconciler
            .reconcile()
            .instrument(reconcile_span!("content"))
            .await?;
        events::reconcile_completed(
            report.changed(),
            report.fetched,
            report.inserted,
            report.updated,
            report.removed,
            report.skipped,
        );
        Ok(report)
    }

    /// The current index, rebuilt first when stale or missing.
    ///
    /// Single-flight: a caller arriving while a pass runs waits for it and
    /// uses its result rather than starting another.
    pub async fn ensure_index(&self) -> Arc<EmbeddingIndex> {
        if let Some(index) = self.fresh_index() {
            return index;
        }
        let _gate = self.refresh_gate.lock().await;
        if let Some(index) = self.fresh_index() {
            return index;
        }
        self.rebuild_index().await
    }

    /// Listing-path refresh: spawn a detached pass when the index is stale
    /// and none is running. Returns the task handle when one was spawned.
    pub fn refresh_in_background(self: &Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if self.fresh_index().is_some() {
            return None;
        }
        if self.is_refreshing() {
            events::refresh_skipped("pass in progress");
            return None;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            events::refresh_skipped("no async runtime");
            return None;
        };
        let pipeline = Arc::clone(self);
        Some(handle.spawn(async move {
            pipeline.ensure_index().await;
        }))
    }

    /// Blocking answer.
    pub async fn ask(&self, question: &str) -> BeaconResult<Answer> {
        let mut run = QuestionRun::new(question);
        let span = answer_span!(run.id(), "blocking");
        let result = async {
            let ranked = self.retrieve(&mut run, question).await?;
            run.advance(QuestionPhase::Generating);
            self.composer.answer(question, &ranked).await
        }
        .instrument(span)
        .await;
        self.finish_run(run, &result);
        result
    }

    /// Streamed answer; each chunk goes to `on_chunk` as it arrives.
    pub async fn ask_streaming<F>(
        &self,
        question: &str,
        cancel: &CancellationToken,
        on_chunk: F,
    ) -> BeaconResult<Answer>
    where
        F: FnMut(&str) + Send,
    {
        let mut run = QuestionRun::new(question);
        let span = answer_span!(run.id(), "streaming");
        let result = async {
            let ranked = self.retrieve(&mut run, question).await?;
            run.advance(QuestionPhase::Generating);
            self.composer
                .answer_streaming(question, &ranked, cancel, on_chunk)
                .await
        }
        .instrument(span)
        .await;
        self.finish_run(run, &result);
        result
    }

    /// Streamed answer as wire frames. The sequence always ends with exactly
    /// one `done` or `error` frame, including when retrieval fails.
    pub async fn ask_framed(
        &self,
        question: &str,
        cancel: &CancellationToken,
        frames: &UnboundedSender<AnswerFrame>,
    ) -> BeaconResult<Answer> {
        let mut run = QuestionRun::new(question);
        let span = answer_span!(run.id(), "framed");
        let result = async {
            let ranked = match self.retrieve(&mut run, question).await {
                Ok(ranked) => ranked,
                Err(e) => {
                    let _ = frames.send(AnswerFrame::Error {
                        message: e.user_message(),
                        retryable: e.is_retryable(),
                    });
                    return Err(e);
                }
            };
            run.advance(QuestionPhase::Generating);
            self.composer
                .answer_framed(question, &ranked, cancel, frames)
                .await
        }
        .instrument(span)
        .await;
        self.finish_run(run, &result);
        result
    }

    /// One page of records. Kicks off a background index refresh when the
    /// index is stale, without waiting for it.
    pub fn list(
        self: &Arc<Self>,
        filter: &ResourceFilter,
        page: usize,
        page_size: usize,
    ) -> BeaconResult<Page<Record>> {
        self.refresh_in_background();
        Ok(self.query_engine.query(filter, page, page_size)?)
    }

    pub fn facets(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.query_engine.facets()
    }

    pub fn record_usage(&self, id: RecordId, kind: UsageKind) -> BeaconResult<UsageCounts> {
        Ok(self.store.increment_usage(id, kind)?)
    }

    /// Most recent questions, oldest first.
    pub fn recent_questions(&self) -> Vec<QuestionLogEntry> {
        self.question_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries()
            .cloned()
            .collect()
    }

    fn fresh_index(&self) -> Option<Arc<EmbeddingIndex>> {
        if self.needs_update() {
            return None;
        }
        self.index()
    }

    /// Full embedding pass. Caller holds the refresh gate.
    async fn rebuild_index(&self) -> Arc<EmbeddingIndex> {
        self.in_progress.store(true, Ordering::Release);
        // Cleared before reading the store so a reconciliation landing
        // mid-pass marks the result stale again.
        self.needs_update.store(false, Ordering::Release);
        let mut guard = PassGuard {
            in_progress: &self.in_progress,
            needs_update: &self.needs_update,
            published: false,
        };

        let started = Instant::now();
        let snapshot = self.store.snapshot();
        let records = self.store.all();
        let embedded = self
            .generator
            .embed_all(&records)
            .instrument(embedding_span!(self.generator.provider_name(), records.len()))
            .await;
        let indexed = embedded.len();

        let index = Arc::new(EmbeddingIndex::build(
            embedded,
            self.generator.dimensions(),
            self.clock.now(),
            snapshot.version(),
        ));
        *self.index.write().unwrap_or_else(|e| e.into_inner()) = Some(index.clone());
        guard.published = true;

        let missing = index.stale_ids(&records).len();
        if missing > 0 && missing == records.len() {
            warn!(total = records.len(), "no record could be embedded, index stays stale");
            self.needs_update.store(true, Ordering::Release);
        } else if missing > 0 {
            debug!(missing, total = records.len(), "records left out of the index");
        }
        events::index_rebuilt(
            indexed,
            missing,
            records.len(),
            snapshot.version(),
            started.elapsed().as_millis() as u64,
        );
        index
    }

    /// Validate, embed the question and rank the index against it.
    async fn retrieve(
        &self,
        run: &mut QuestionRun,
        question: &str,
    ) -> BeaconResult<Vec<RankedResult>> {
        self.validate_question(question)?;
        run.advance(QuestionPhase::Retrieving);

        let index = self.ensure_index().await;
        let cache_hit = self.query_cache.contains_fresh(question);
        let vector = self.query_cache.get(question).await?;

        let ranked = {
            let _span = ranking_span!(index.len(), self.ranker.top_k()).entered();
            self.ranker.rank_default(&vector, index.entries())?
        };
        debug!(
            run_id = %run.id(),
            cache_hit,
            candidates = index.len(),
            results = ranked.len(),
            "retrieval complete"
        );
        run.set_retrieval(cache_hit, ranked.len());
        Ok(ranked)
    }

    fn validate_question(&self, question: &str) -> Result<(), ValidationError> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyQuestion);
        }
        let length = trimmed.chars().count();
        let max = self.config.answer.max_question_chars;
        if length > max {
            return Err(ValidationError::QuestionTooLong { length, max });
        }
        Ok(())
    }

    fn finish_run(&self, mut run: QuestionRun, result: &BeaconResult<Answer>) {
        match result {
            Ok(_) => {
                run.advance(QuestionPhase::Done);
            }
            Err(e) => {
                warn!(
                    run_id = %run.id(),
                    phase = %run.phase(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "question failed"
                );
                run.fail();
            }
        }
        events::question_finished(
            &run.id().to_string(),
            run.phase(),
            run.result_count(),
            run.elapsed().as_millis() as u64,
        );
        self.question_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(run.to_log_entry());
    }
}
