use crate::constants::GENERIC_ANSWER_FAILURE;

use super::{
    AnnotationParseError, ConfigError, EmbeddingError, GenerationError, MappingError,
    RankingError, SourceError, StoreError, ValidationError,
};

/// Top-level error for every Beacon subsystem.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("annotation error: {0}")]
    Annotation(#[from] AnnotationParseError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type BeaconResult<T> = Result<T, BeaconError>;

impl BeaconError {
    /// Whether retrying the same operation later may succeed.
    ///
    /// Invalid input, programmer errors and configuration errors are not
    /// retryable; everything touching an external service is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Source(_) | Self::Embedding(_) | Self::Annotation(_) => true,
            Self::Generation(e) => !matches!(e, GenerationError::Cancelled),
            Self::Mapping(_)
            | Self::Ranking(_)
            | Self::Validation(_)
            | Self::Config(_)
            | Self::Store(_)
            | Self::Serialization(_) => false,
        }
    }

    /// Message safe to show to the end user.
    ///
    /// Validation errors are echoed back so the user can fix the input;
    /// everything else collapses to a generic retryable message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            _ => GENERIC_ANSWER_FAILURE.to_string(),
        }
    }
}
