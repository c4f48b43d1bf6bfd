//! # beacon-retrieval
//!
//! Scores embedded records against a query vector.
//!
//! ```text
//! SimilarityRanker::rank
//! ├── cosine similarity per record (dimension mismatch is an error)
//! ├── keep score >= threshold, or every record when none pass
//! ├── stable sort, highest first
//! └── truncate to top_k
//! ```

pub mod ranker;
pub mod similarity;

pub use ranker::SimilarityRanker;
pub use similarity::{checked_cosine_similarity, cosine_similarity};
