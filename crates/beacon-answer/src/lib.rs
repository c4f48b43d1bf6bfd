//! # beacon-answer
//!
//! Composes a natural-language answer from ranked records.
//!
//! ```text
//! AnswerComposer
//! ├── PromptBuilder        system instruction + records' full text + question
//! ├── IGenerationProvider  complete() or stream() of Delta/Done/Failed events
//! │   └── ChatApiProvider  OpenAI-compatible chat completions, SSE decoding
//! ├── frame emission       chunk* then exactly one done | error
//! └── AnnotationDecoder    trailing RELEVANT_RECORDS list → record ids
//! ```

pub mod annotation;
pub mod composer;
pub mod prompt;
pub mod providers;

pub use annotation::{resolve_record_ids, AnnotationDecoder, DecodedAnnotation};
pub use composer::AnswerComposer;
pub use prompt::PromptBuilder;
pub use providers::{ChatApiProvider, SseDecoder};
