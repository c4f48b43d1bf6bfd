/// Content source errors. Any of these aborts a reconciliation and leaves the
/// record store untouched.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("content source unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("content source rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed content source response: {reason}")]
    Malformed { reason: String },

    #[error("content source returned no usable records while {existing} records are held")]
    EmptyResult { existing: usize },
}
