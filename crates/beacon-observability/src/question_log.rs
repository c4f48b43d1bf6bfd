//! Question log: question text, phase reached, latency, result count and
//! whether the query embedding came from the cache.

use std::collections::VecDeque;
use std::time::Duration;

use beacon_core::config::defaults::DEFAULT_QUESTION_LOG_CAPACITY;
use beacon_core::models::QuestionPhase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionLogEntry {
    pub run_id: String,
    pub question: String,
    /// Terminal phase: `Done`, or `Failed`.
    pub phase: QuestionPhase,
    /// Last phase entered before the terminal one.
    pub reached: QuestionPhase,
    pub latency: Duration,
    pub result_count: usize,
    pub cache_hit: bool,
    pub timestamp_epoch_ms: i64,
}

impl QuestionLogEntry {
    /// Create a new entry with the timestamp set to now.
    pub fn new(
        run_id: impl Into<String>,
        question: impl Into<String>,
        phase: QuestionPhase,
        reached: QuestionPhase,
        latency: Duration,
        result_count: usize,
        cache_hit: bool,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            question: question.into(),
            phase,
            reached,
            latency,
            result_count,
            cache_hit,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.phase == QuestionPhase::Done
    }
}

/// Ring buffer of recent questions. The oldest entry is dropped once the
/// capacity is reached.
#[derive(Debug, Clone)]
pub struct QuestionLog {
    entries: VecDeque<QuestionLogEntry>,
    max_entries: usize,
}

impl QuestionLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUESTION_LOG_CAPACITY)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn record(&mut self, entry: QuestionLogEntry) {
        tracing::debug!(
            event = "question_logged",
            run_id = %entry.run_id,
            phase = %entry.phase,
            latency_ms = entry.latency.as_millis() as u64,
            result_count = entry.result_count,
            cache_hit = entry.cache_hit,
            "question logged"
        );

        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &QuestionLogEntry> {
        self.entries.iter()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.succeeded()).count()
    }

    /// Fraction of questions whose embedding was served from the cache.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let hits = self.entries.iter().filter(|e| e.cache_hit).count();
        hits as f64 / self.entries.len() as f64
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Latency at the given percentile (0.0 to 1.0).
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let mut latencies: Vec<Duration> = self.entries.iter().map(|e| e.latency).collect();
        latencies.sort();
        let last = latencies.len() - 1;
        let idx = ((p.clamp(0.0, 1.0) * last as f64).round() as usize).min(last);
        latencies[idx]
    }
}

impl Default for QuestionLog {
    fn default() -> Self {
        Self::new()
    }
}
