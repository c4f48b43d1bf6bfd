use serde::{Deserialize, Serialize};

use super::Record;

/// A record paired with the embedding of its current embeddable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedRecord {
    pub record: Record,
    pub vector: Vec<f32>,
    /// Blake3 hash of the text the vector was computed from.
    pub text_hash: String,
}

/// A record scored against a query. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub record: Record,
    /// Cosine similarity in [-1, 1].
    pub score: f64,
}
