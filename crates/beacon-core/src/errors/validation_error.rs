/// Malformed caller input, rejected before any external call is made.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("question is {length} characters, maximum is {max}")]
    QuestionTooLong { length: usize, max: usize },

    #[error("page must be 1 or greater")]
    InvalidPage,

    #[error("page size {page_size} out of range 1..={max}")]
    InvalidPageSize { page_size: usize, max: usize },

    #[error("unknown sort order: {value}")]
    UnknownSort { value: String },

    #[error("unknown visibility: {value}")]
    UnknownVisibility { value: String },
}
