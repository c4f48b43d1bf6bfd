//! # beacon-sync
//!
//! Mirrors the external content source into the record store.
//!
//! ## Architecture
//!
//! ```text
//! ContentReconciler
//! ├── IContentSource::fetch_all      (HttpContentSource in production)
//! ├── FieldMapping                   raw fields → RecordDraft, per-record errors
//! ├── empty-fetch guard
//! └── RecordStore::replace_all       one atomic swap, ids kept by external id
//!         └── marks the embedding index stale
//! ```

pub mod http_source;
pub mod mapping;
pub mod reconciler;

pub use http_source::HttpContentSource;
pub use mapping::{FieldMapping, FieldSpec, FieldTarget, Requirement};
pub use reconciler::{ContentReconciler, ReconcileReport};
