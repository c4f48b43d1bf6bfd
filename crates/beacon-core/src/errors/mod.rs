//! Error handling for Beacon.
//! One error enum per subsystem, `thiserror` only, aggregated into `BeaconError`.

pub mod annotation_error;
pub mod beacon_error;
pub mod config_error;
pub mod embedding_error;
pub mod generation_error;
pub mod mapping_error;
pub mod ranking_error;
pub mod source_error;
pub mod store_error;
pub mod validation_error;

pub use annotation_error::AnnotationParseError;
pub use beacon_error::{BeaconError, BeaconResult};
pub use config_error::ConfigError;
pub use embedding_error::EmbeddingError;
pub use generation_error::GenerationError;
pub use mapping_error::MappingError;
pub use ranking_error::RankingError;
pub use source_error::SourceError;
pub use store_error::StoreError;
pub use validation_error::ValidationError;
