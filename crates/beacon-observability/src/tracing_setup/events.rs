//! Structured log events for key pipeline operations.

use beacon_core::models::QuestionPhase;

/// Log a finished reconciliation. `changed` is whether the published record
/// set differs from the previous one.
pub fn reconcile_completed(
    changed: bool,
    fetched: usize,
    inserted: usize,
    updated: usize,
    removed: usize,
    skipped: usize,
) {
    tracing::info!(
        event = "reconcile_completed",
        changed,
        fetched,
        inserted,
        updated,
        removed,
        skipped,
        "reconciliation completed"
    );
}

/// Log a rebuilt embedding index. `missing` counts records left without a
/// vector.
pub fn index_rebuilt(indexed: usize, missing: usize, total: usize, store_version: u64, elapsed_ms: u64) {
    tracing::info!(
        event = "index_rebuilt",
        indexed,
        missing,
        total,
        store_version,
        elapsed_ms,
        "embedding index rebuilt"
    );
}

/// Log a background refresh that was skipped because one is running.
pub fn refresh_skipped(reason: &str) {
    tracing::debug!(event = "refresh_skipped", reason = %reason, "index refresh skipped");
}

/// Log a question that reached a terminal phase.
pub fn question_finished(run_id: &str, phase: QuestionPhase, results: usize, elapsed_ms: u64) {
    match phase {
        QuestionPhase::Done => tracing::info!(
            event = "question_answered",
            run_id = %run_id,
            results,
            elapsed_ms,
            "question answered"
        ),
        _ => tracing::warn!(
            event = "question_failed",
            run_id = %run_id,
            phase = %phase,
            results,
            elapsed_ms,
            "question failed"
        ),
    }
}
