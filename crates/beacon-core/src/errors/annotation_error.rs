/// Errors decoding the trailing referenced-records annotation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationParseError {
    #[error("annotation marker present but list is unreadable: {fragment}")]
    UnreadableList { fragment: String },

    #[error("annotation list is empty")]
    EmptyList,
}
