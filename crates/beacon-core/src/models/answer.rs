use serde::{Deserialize, Serialize};

use super::RecordId;

/// A composed answer with the records it draws on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub text: String,
    pub relevant_record_ids: Vec<RecordId>,
}

/// One frame of the streamed answer delivery contract.
///
/// Frames arrive strictly in order and exactly one terminal frame
/// (`Done` or `Error`) closes the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnswerFrame {
    Chunk { text: String },
    Done(Answer),
    Error { message: String, retryable: bool },
}

impl AnswerFrame {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Chunk { .. })
    }

    /// Serialize the frame as a server-sent event (`data: {...}\n\n`).
    pub fn to_sse(&self) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}
