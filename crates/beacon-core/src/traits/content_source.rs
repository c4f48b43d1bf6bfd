use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::RawRecord;

/// The external system of record the reconciler mirrors.
#[async_trait]
pub trait IContentSource: Send + Sync {
    /// Fetch the complete record set. Partial results are never returned:
    /// any failure fails the whole fetch.
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError>;

    /// Human-readable source name for logs.
    fn name(&self) -> &str;
}
