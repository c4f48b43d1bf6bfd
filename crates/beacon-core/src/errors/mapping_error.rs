/// Errors mapping a single raw source record into a record draft.
/// The offending record is skipped; reconciliation continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    #[error("record {external_id}: required field `{field}` missing (tried {candidates})")]
    MissingField {
        external_id: String,
        field: String,
        candidates: String,
    },

    #[error("record {external_id}: invalid value for `{field}`: {reason}")]
    InvalidValue {
        external_id: String,
        field: String,
        reason: String,
    },

    #[error("record {external_id}: duplicate external id in fetched set")]
    DuplicateExternalId { external_id: String },

    #[error("record has an empty external id")]
    EmptyExternalId,
}
