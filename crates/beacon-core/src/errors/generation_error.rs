/// Answer generation errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation stream closed after {received_chunks} chunks without a terminal signal")]
    IncompleteStream { received_chunks: usize },

    #[error("generation provider failed: {reason}")]
    ProviderFailed { reason: String },

    #[error("generation request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("generation cancelled by caller")]
    Cancelled,
}
