//! Generation providers.

pub mod chat_api;
pub mod sse;

pub use chat_api::ChatApiProvider;
pub use sse::SseDecoder;
