pub mod answer;
pub mod embedded;
pub mod prompt;
pub mod question;
pub mod raw_record;
pub mod record;

pub use answer::{Answer, AnswerFrame};
pub use embedded::{EmbeddedRecord, RankedResult};
pub use prompt::Prompt;
pub use question::QuestionPhase;
pub use raw_record::{FieldValue, RawRecord};
pub use record::{Record, RecordDraft, RecordId, TagSet, UsageCounts, UsageKind, Visibility};
