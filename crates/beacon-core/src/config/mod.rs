pub mod answer_config;
pub mod beacon_config;
pub mod defaults;
pub mod embedding_config;
pub mod observability_config;
pub mod query_config;
pub mod retrieval_config;
pub mod sync_config;

pub use answer_config::AnswerConfig;
pub use beacon_config::BeaconConfig;
pub use embedding_config::EmbeddingConfig;
pub use observability_config::ObservabilityConfig;
pub use query_config::QueryConfig;
pub use retrieval_config::RetrievalConfig;
pub use sync_config::SyncConfig;
