//! # beacon-query
//!
//! Structured listing over the record store, independent of the semantic
//! path.
//!
//! ```text
//! ResourceQueryEngine
//! ├── ResourceFilter   type, tags, audience, free text, exclusions
//! ├── SortBy           relevance | popularity | newest | oldest
//! ├── Page<T>          1-based page with the filtered total
//! └── facets()         distinct values per filterable field
//! ```

pub mod engine;
pub mod filter;
pub mod page;

pub use engine::ResourceQueryEngine;
pub use filter::{ResourceFilter, SortBy};
pub use page::Page;
