use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::BeaconResult;
use crate::models::Prompt;

/// One event of a streamed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// Incremental text.
    Delta(String),
    /// Terminal success signal.
    Done,
    /// Terminal failure signal reported by the provider.
    Failed(String),
}

impl GenerationEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Delta(_))
    }
}

/// Ordered stream of generation events. Dropping it abandons the underlying
/// transport. If the stream ends without a terminal event the generation is
/// incomplete.
pub type GenerationStream = BoxStream<'static, GenerationEvent>;

/// Text generation function.
#[async_trait]
pub trait IGenerationProvider: Send + Sync {
    /// Single blocking call returning the full text.
    async fn complete(&self, prompt: &Prompt) -> BeaconResult<String>;

    /// Start a streamed generation.
    async fn stream(&self, prompt: &Prompt) -> BeaconResult<GenerationStream>;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
