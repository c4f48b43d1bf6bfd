//! # beacon-core
//!
//! Foundation crate for the Beacon retrieval pipeline.
//! Defines the record model, the traits for external collaborators
//! (content source, embedding function, generation function), errors,
//! config, constants, the injectable clock and the cancellation token.
//! Every other crate in the workspace depends on this.

pub mod cancellation;
pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use cancellation::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BeaconConfig;
pub use errors::{BeaconError, BeaconResult};
pub use models::{
    Answer, AnswerFrame, EmbeddedRecord, QuestionPhase, RankedResult, RawRecord, Record,
    RecordDraft, RecordId, TagSet, UsageCounts, UsageKind, Visibility,
};
