//! # beacon-observability
//!
//! Structured logging for the pipeline: subscriber installation with an
//! `EnvFilter` read from `BEACON_LOG`, span macros per operation, named
//! events, and a bounded in-memory log of answered questions.

pub mod question_log;
pub mod tracing_setup;

pub use question_log::{QuestionLog, QuestionLogEntry};
pub use tracing_setup::{init_tracing, init_tracing_with_filter, LOG_ENV};

#[doc(hidden)]
pub use tracing;
