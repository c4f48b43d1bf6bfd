//! EmbeddingIndex: the immutable product of one full embedding pass.

use std::collections::HashMap;

use beacon_core::models::{EmbeddedRecord, Record, RecordId};
use chrono::{DateTime, Utc};

use crate::text::{embedding_text, text_hash};

#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    entries: Vec<EmbeddedRecord>,
    positions: HashMap<RecordId, usize>,
    dimensions: usize,
    built_at: DateTime<Utc>,
    store_version: u64,
}

impl EmbeddingIndex {
    /// Build from `(record, vector)` pairs, hashing each record's current
    /// embedding text.
    pub fn build(
        embedded: Vec<(Record, Vec<f32>)>,
        dimensions: usize,
        built_at: DateTime<Utc>,
        store_version: u64,
    ) -> Self {
        let entries: Vec<EmbeddedRecord> = embedded
            .into_iter()
            .map(|(record, vector)| EmbeddedRecord {
                text_hash: text_hash(&embedding_text(&record)),
                record,
                vector,
            })
            .collect();
        let positions = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.record.id, i))
            .collect();
        Self {
            entries,
            positions,
            dimensions,
            built_at,
            store_version,
        }
    }

    pub fn empty(dimensions: usize, built_at: DateTime<Utc>) -> Self {
        Self::build(Vec::new(), dimensions, built_at, 0)
    }

    pub fn entries(&self) -> &[EmbeddedRecord] {
        &self.entries
    }

    pub fn get(&self, id: RecordId) -> Option<&EmbeddedRecord> {
        self.positions.get(&id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Store version the pass was computed from.
    pub fn store_version(&self) -> u64 {
        self.store_version
    }

    /// Ids of `records` whose embedding text no longer matches the indexed
    /// hash, or that are not indexed at all.
    pub fn stale_ids(&self, records: &[Record]) -> Vec<RecordId> {
        records
            .iter()
            .filter(|r| match self.get(r.id) {
                Some(entry) => entry.text_hash != text_hash(&embedding_text(r)),
                None => true,
            })
            .map(|r| r.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::models::RecordDraft;

    fn record(id: u64, name: &str) -> Record {
        let draft = RecordDraft {
            external_id: format!("ext-{id}"),
            name: name.to_string(),
            summary: "summary".into(),
            ..Default::default()
        };
        Record::from_draft(RecordId(id), draft, Utc::now())
    }

    #[test]
    fn lookup_by_record_id() {
        let index = EmbeddingIndex::build(
            vec![(record(1, "a"), vec![1.0, 0.0]), (record(2, "b"), vec![0.0, 1.0])],
            2,
            Utc::now(),
            3,
        );
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(RecordId(2)).unwrap().vector, vec![0.0, 1.0]);
        assert!(index.get(RecordId(9)).is_none());
        assert_eq!(index.store_version(), 3);
    }

    #[test]
    fn detects_changed_and_missing_records() {
        let index = EmbeddingIndex::build(
            vec![(record(1, "a"), vec![1.0]), (record(2, "b"), vec![1.0])],
            1,
            Utc::now(),
            1,
        );
        let current = vec![record(1, "a"), record(2, "b renamed"), record(3, "c")];
        assert_eq!(index.stale_ids(&current), vec![RecordId(2), RecordId(3)]);
    }
}
