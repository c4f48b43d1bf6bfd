//! QuestionRun: the lifecycle of one question.

use std::time::{Duration, Instant};

use beacon_core::models::QuestionPhase;
use beacon_observability::QuestionLogEntry;
use tracing::warn;
use uuid::Uuid;

/// Per-question state. A fresh run is created for every question; runs share
/// nothing but the pipeline's caches.
#[derive(Debug)]
pub struct QuestionRun {
    id: Uuid,
    question: String,
    phase: QuestionPhase,
    reached: QuestionPhase,
    started: Instant,
    cache_hit: bool,
    result_count: usize,
}

impl QuestionRun {
    pub fn new(question: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.to_string(),
            phase: QuestionPhase::Idle,
            reached: QuestionPhase::Idle,
            started: Instant::now(),
            cache_hit: false,
            result_count: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn phase(&self) -> QuestionPhase {
        self.phase
    }

    /// Last non-terminal phase entered.
    pub fn reached(&self) -> QuestionPhase {
        self.reached
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn cache_hit(&self) -> bool {
        self.cache_hit
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    pub(crate) fn set_retrieval(&mut self, cache_hit: bool, result_count: usize) {
        self.cache_hit = cache_hit;
        self.result_count = result_count;
    }

    /// Move forward. Returns false, leaving the phase unchanged, for a
    /// transition the lifecycle does not allow.
    pub fn advance(&mut self, next: QuestionPhase) -> bool {
        if !self.phase.can_transition_to(next) {
            warn!(run_id = %self.id, from = %self.phase, to = %next, "rejected question phase transition");
            return false;
        }
        if !next.is_terminal() {
            self.reached = next;
        }
        self.phase = next;
        true
    }

    pub fn fail(&mut self) -> bool {
        self.advance(QuestionPhase::Failed)
    }

    pub fn to_log_entry(&self) -> QuestionLogEntry {
        QuestionLogEntry::new(
            self.id.to_string(),
            self.question.clone(),
            self.phase,
            self.reached,
            self.elapsed(),
            self.result_count,
            self.cache_hit,
        )
    }
}
