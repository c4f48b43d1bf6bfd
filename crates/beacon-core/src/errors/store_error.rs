/// Record store errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {id}")]
    RecordNotFound { id: u64 },

    #[error("external id already present: {external_id}")]
    DuplicateExternalId { external_id: String },
}
