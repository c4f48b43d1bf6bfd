pub mod content_source;
pub mod embedding;
pub mod generation;

pub use content_source::IContentSource;
pub use embedding::IEmbeddingProvider;
pub use generation::{GenerationEvent, GenerationStream, IGenerationProvider};
