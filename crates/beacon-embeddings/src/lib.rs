//! # beacon-embeddings
//!
//! Turns records and queries into vectors.
//!
//! ## Architecture
//!
//! ```text
//! EmbeddingGenerator
//! ├── embedding text builder (name | body-or-summary | category | tags)
//! ├── batches of `batch_size`, staggered concurrent calls, delay between batches
//! └── IEmbeddingProvider
//!     ├── ApiEmbeddingProvider (OpenAI-compatible, retry with backoff)
//!     └── TfIdfEmbeddingProvider (local, always available)
//! QueryEmbeddingCache   normalized query → vector, TTL on read, injected clock
//! EmbeddingIndex        immutable product of one full embedding pass
//! ```

pub mod cache;
pub mod generator;
pub mod index;
pub mod providers;
pub mod text;

pub use cache::QueryEmbeddingCache;
pub use generator::EmbeddingGenerator;
pub use index::EmbeddingIndex;
pub use providers::{create_provider, ApiEmbeddingProvider, TfIdfEmbeddingProvider};
pub use text::{embedding_text, text_hash};
