use std::time::Duration;

use beacon_core::config::ObservabilityConfig;
use beacon_core::models::QuestionPhase;
use beacon_observability::tracing_setup::{events, spans};
use beacon_observability::{init_tracing, QuestionLog, QuestionLogEntry};

fn entry(question: &str, phase: QuestionPhase, latency_ms: u64, cache_hit: bool) -> QuestionLogEntry {
    let reached = match phase {
        QuestionPhase::Done => QuestionPhase::Generating,
        _ => QuestionPhase::Retrieving,
    };
    QuestionLogEntry::new(
        format!("run-{question}"),
        question,
        phase,
        reached,
        Duration::from_millis(latency_ms),
        2,
        cache_hit,
    )
}

#[test]
fn log_drops_oldest_past_capacity() {
    let mut log = QuestionLog::with_capacity(3);
    for q in ["a", "b", "c", "d", "e"] {
        log.record(entry(q, QuestionPhase::Done, 10, false));
    }
    assert_eq!(log.count(), 3);
    let questions: Vec<&str> = log.entries().map(|e| e.question.as_str()).collect();
    assert_eq!(questions, vec!["c", "d", "e"]);
}

#[test]
fn aggregates() {
    let mut log = QuestionLog::new();
    assert_eq!(log.avg_latency(), Duration::ZERO);
    assert_eq!(log.cache_hit_rate(), 0.0);

    log.record(entry("a", QuestionPhase::Done, 10, true));
    log.record(entry("b", QuestionPhase::Done, 30, false));
    log.record(entry("c", QuestionPhase::Failed, 20, true));
    log.record(entry("d", QuestionPhase::Done, 40, true));

    assert_eq!(log.avg_latency(), Duration::from_millis(25));
    assert_eq!(log.latency_percentile(0.0), Duration::from_millis(10));
    assert_eq!(log.latency_percentile(1.0), Duration::from_millis(40));
    assert_eq!(log.failure_count(), 1);
    assert!((log.cache_hit_rate() - 0.75).abs() < 1e-9);
}

#[test]
fn entry_serializes_phase_names() {
    let json = serde_json::to_value(entry("q", QuestionPhase::Failed, 5, false)).unwrap();
    assert_eq!(json["phase"], "failed");
    assert_eq!(json["reached"], "retrieving");
}

#[test]
fn subscriber_installs_once_and_spans_work() {
    let config = ObservabilityConfig {
        log_level: "debug".into(),
        ..Default::default()
    };
    init_tracing(&config);
    assert!(!init_tracing(&config));

    let span = beacon_observability::answer_span!("run-1", "framed");
    let _guard = span.enter();
    let _ranking = beacon_observability::ranking_span!(12usize, 5usize);
    events::question_finished("run-1", QuestionPhase::Done, 2, 15);
    events::refresh_skipped("in progress");
    assert_eq!(spans::names::ANSWER, "beacon.answer");
}
