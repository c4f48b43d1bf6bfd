//! # beacon-pipeline
//!
//! Wires the subsystems into the portal's two entry paths.
//!
//! ```text
//! PortalPipeline
//! ├── sync()                ContentReconciler → RecordStore, marks index stale
//! ├── ensure_index()        single-flight EmbeddingGenerator pass → EmbeddingIndex
//! ├── refresh_in_background()
//! ├── ask / ask_streaming / ask_framed
//! │   └── QuestionRun       Idle → Retrieving → Generating → Done | Failed
//! │       ├── QueryEmbeddingCache → SimilarityRanker
//! │       └── AnswerComposer
//! └── list / facets / record_usage   ResourceQueryEngine, usage counters
//! ```

pub mod pipeline;
pub mod run;

pub use pipeline::PortalPipeline;
pub use run::QuestionRun;
