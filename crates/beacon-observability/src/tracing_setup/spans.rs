//! Span definitions per operation: reconciliation, embedding, ranking,
//! answering.

/// Create a reconciliation span.
#[macro_export]
macro_rules! reconcile_span {
    ($source:expr) => {
        $crate::tracing::info_span!("beacon.reconcile", source = %$source)
    };
}

/// Create an embedding pass span.
#[macro_export]
macro_rules! embedding_span {
    ($provider:expr, $records:expr) => {
        $crate::tracing::info_span!("beacon.embedding", provider = %$provider, records = $records)
    };
}

/// Create a ranking span.
#[macro_export]
macro_rules! ranking_span {
    ($candidates:expr, $top_k:expr) => {
        $crate::tracing::info_span!("beacon.ranking", candidates = $candidates, top_k = $top_k)
    };
}

/// Create an answer span.
#[macro_export]
macro_rules! answer_span {
    ($run_id:expr, $mode:expr) => {
        $crate::tracing::info_span!("beacon.answer", run_id = %$run_id, mode = %$mode)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RECONCILE: &str = "beacon.reconcile";
    pub const EMBEDDING: &str = "beacon.embedding";
    pub const RANKING: &str = "beacon.ranking";
    pub const ANSWER: &str = "beacon.answer";
}
