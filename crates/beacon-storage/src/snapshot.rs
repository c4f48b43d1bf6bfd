//! Immutable view of the record content at one point in time.

use std::collections::HashMap;
use std::sync::Arc;

use beacon_core::models::{Record, RecordId};

/// One published generation of the store's content.
///
/// Records keep insertion order; lookups by internal and external id are
/// indexed. Usage counters are zero here; the store overlays live values.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    records: Vec<Arc<Record>>,
    by_id: HashMap<RecordId, usize>,
    by_external_id: HashMap<String, usize>,
    version: u64,
}

impl StoreSnapshot {
    pub(crate) fn build(records: Vec<Arc<Record>>, version: u64) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_external_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            by_id.insert(record.id, idx);
            by_external_id.insert(record.external_id.clone(), idx);
        }
        Self {
            records,
            by_id,
            by_external_id,
            version,
        }
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&Arc<Record>> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    pub fn get_by_external_id(&self, external_id: &str) -> Option<&Arc<Record>> {
        self.by_external_id
            .get(external_id)
            .map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Monotonic write counter; bumps on every published change.
    pub fn version(&self) -> u64 {
        self.version
    }
}
