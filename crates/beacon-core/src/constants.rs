/// Beacon system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Marker that opens the trailing referenced-records annotation in generated answers.
pub const ANNOTATION_MARKER: &str = "RELEVANT_RECORDS";

/// Separator placed between the parts of a record's embeddable text.
pub const EMBEDDING_TEXT_SEPARATOR: &str = " | ";

/// Message shown to a user when answering a question failed for any reason
/// other than invalid input.
pub const GENERIC_ANSWER_FAILURE: &str =
    "Something went wrong while answering your question. Please try again.";
