//! RecordStore: snapshot-and-swap content plus independent usage counters.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use beacon_core::clock::{Clock, SystemClock};
use beacon_core::errors::StoreError;
use beacon_core::models::{Record, RecordDraft, RecordId, UsageCounts, UsageKind};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::counters::UsageCounters;
use crate::snapshot::StoreSnapshot;

/// What a bulk replace changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Absent from the drafts but kept as they were.
    pub retained: usize,
    pub removed: usize,
}

/// In-memory record collection keyed by internal and external id.
pub struct RecordStore {
    current: RwLock<Arc<StoreSnapshot>>,
    /// Held for the whole read-build-publish sequence of every writer.
    write_gate: Mutex<()>,
    counters: DashMap<RecordId, UsageCounters>,
    next_id: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store that stamps `last_synced` from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            current: RwLock::new(Arc::new(StoreSnapshot::default())),
            write_gate: Mutex::new(()),
            counters: DashMap::new(),
            next_id: AtomicU64::new(1),
            clock,
        }
    }

    /// The current published snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Insert a new record. The external id must not already be present.
    pub fn create(&self, draft: RecordDraft) -> Result<RecordId, StoreError> {
        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.snapshot();
        if current.get_by_external_id(&draft.external_id).is_some() {
            return Err(StoreError::DuplicateExternalId {
                external_id: draft.external_id,
            });
        }

        let id = self.allocate_id();
        let record = Arc::new(Record::from_draft(id, draft, self.clock.now()));
        let mut records = current.records().to_vec();
        records.push(record);
        self.publish(records, current.version() + 1);
        debug!(id = %id, "record created");
        Ok(id)
    }

    /// Replace the content fields of an existing record in place.
    /// Usage counters are untouched.
    pub fn update(&self, id: RecordId, draft: RecordDraft) -> Result<(), StoreError> {
        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.snapshot();
        if !current.contains(id) {
            return Err(StoreError::RecordNotFound { id: id.0 });
        }
        if let Some(other) = current.get_by_external_id(&draft.external_id) {
            if other.id != id {
                return Err(StoreError::DuplicateExternalId {
                    external_id: draft.external_id,
                });
            }
        }

        let mut records = current.records().to_vec();
        if let Some(slot) = records.iter_mut().find(|r| r.id == id) {
            *slot = Arc::new(Record::from_draft(id, draft, self.clock.now()));
        }
        self.publish(records, current.version() + 1);
        debug!(id = %id, "record updated");
        Ok(())
    }

    /// Replace the whole content set in one atomic swap.
    ///
    /// Records whose external id already exists keep their internal id (and
    /// therefore their usage counters); new external ids get fresh ids;
    /// records absent from `drafts` are removed. The new set is built off to
    /// the side and published at once, so readers see either the old or the
    /// new set, never a mix. Later duplicates of an external id are dropped.
    pub fn replace_all(&self, drafts: Vec<RecordDraft>) -> ReplaceOutcome {
        self.replace_all_retaining(drafts, &HashSet::new())
    }

    /// [`replace_all`](Self::replace_all), except that stored records whose
    /// external id is in `retain` and which have no draft are kept unchanged,
    /// with their id, content and counters. They follow the drafts in store
    /// order.
    pub fn replace_all_retaining(
        &self,
        drafts: Vec<RecordDraft>,
        retain: &HashSet<String>,
    ) -> ReplaceOutcome {
        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.snapshot();
        let now = self.clock.now();

        let mut outcome = ReplaceOutcome::default();
        let mut seen: HashSet<String> = HashSet::with_capacity(drafts.len());
        let mut records = Vec::with_capacity(drafts.len());

        for draft in drafts {
            if !seen.insert(draft.external_id.clone()) {
                warn!(external_id = %draft.external_id, "duplicate external id dropped");
                continue;
            }
            let id = match current.get_by_external_id(&draft.external_id) {
                Some(existing) => {
                    if existing.to_draft() == draft {
                        outcome.unchanged += 1;
                    } else {
                        outcome.updated += 1;
                    }
                    existing.id
                }
                None => {
                    outcome.inserted += 1;
                    self.allocate_id()
                }
            };
            records.push(Arc::new(Record::from_draft(id, draft, now)));
        }

        for existing in current.records() {
            if retain.contains(&existing.external_id) && seen.insert(existing.external_id.clone()) {
                outcome.retained += 1;
                records.push(existing.clone());
            }
        }

        let removed: Vec<RecordId> = current
            .records()
            .iter()
            .filter(|r| !seen.contains(&r.external_id))
            .map(|r| r.id)
            .collect();
        outcome.removed = removed.len();

        self.publish(records, current.version() + 1);
        for id in removed {
            self.counters.remove(&id);
        }

        info!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            unchanged = outcome.unchanged,
            retained = outcome.retained,
            removed = outcome.removed,
            "record set replaced"
        );
        outcome
    }

    /// Bump one usage counter of a record. Content is untouched.
    ///
    /// Runs under the write gate so a concurrent replace cannot remove the
    /// record between the existence check and the counter insert.
    pub fn increment_usage(&self, id: RecordId, kind: UsageKind) -> Result<UsageCounts, StoreError> {
        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());
        if !self.snapshot().contains(id) {
            return Err(StoreError::RecordNotFound { id: id.0 });
        }
        let entry = self.counters.entry(id).or_default();
        entry.increment(kind);
        Ok(entry.snapshot())
    }

    pub fn usage(&self, id: RecordId) -> UsageCounts {
        self.counters
            .get(&id)
            .map(|c| c.snapshot())
            .unwrap_or_default()
    }

    /// A record with its live usage counters.
    pub fn get(&self, id: RecordId) -> Option<Record> {
        self.snapshot().get(id).map(|r| self.with_usage(r))
    }

    pub fn get_by_external_id(&self, external_id: &str) -> Option<Record> {
        self.snapshot()
            .get_by_external_id(external_id)
            .map(|r| self.with_usage(r))
    }

    /// Every record in store order, with live usage counters.
    pub fn all(&self) -> Vec<Record> {
        self.snapshot()
            .records()
            .iter()
            .map(|r| self.with_usage(r))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    fn with_usage(&self, record: &Arc<Record>) -> Record {
        let mut record = Record::clone(record);
        record.usage = self.usage(record.id);
        record
    }

    fn allocate_id(&self) -> RecordId {
        RecordId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn publish(&self, records: Vec<Arc<Record>>, version: u64) {
        let next = Arc::new(StoreSnapshot::build(records, version));
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = next;
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
