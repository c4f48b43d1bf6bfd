/// Ranking errors. A dimension mismatch is a programmer error: the query and
/// the indexed records were embedded by different models.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    #[error("vector dimension mismatch: query has {query}, record {record_id} has {record}")]
    DimensionMismatch {
        record_id: u64,
        query: usize,
        record: usize,
    },
}
