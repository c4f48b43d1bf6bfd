//! ContentReconciler: pull the full external record set and mirror it into
//! the store in one atomic swap.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use beacon_core::config::SyncConfig;
use beacon_core::errors::{BeaconResult, MappingError, SourceError};
use beacon_core::traits::IContentSource;
use beacon_storage::RecordStore;
use tracing::{info, warn};

use crate::mapping::FieldMapping;

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Raw records returned by the source.
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
    /// Raw records that failed mapping.
    pub skipped: usize,
    /// Skipped records whose stored version was kept.
    pub retained: usize,
    pub errors: Vec<MappingError>,
    pub duration: Duration,
}

impl ReconcileReport {
    /// Whether the published record set differs from the previous one.
    pub fn changed(&self) -> bool {
        self.inserted + self.updated + self.removed > 0
    }
}

pub struct ContentReconciler {
    source: Arc<dyn IContentSource>,
    store: Arc<RecordStore>,
    mapping: FieldMapping,
    allow_empty_replace: bool,
    needs_update: Arc<AtomicBool>,
}

impl ContentReconciler {
    pub fn new(source: Arc<dyn IContentSource>, store: Arc<RecordStore>, config: &SyncConfig) -> Self {
        Self {
            source,
            store,
            mapping: FieldMapping::with_aliases(&config.field_aliases),
            allow_empty_replace: config.allow_empty_replace,
            needs_update: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share the embedding index's stale flag. A successful reconciliation
    /// sets it.
    pub fn with_stale_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.needs_update = flag;
        self
    }

    pub fn stale_flag(&self) -> Arc<AtomicBool> {
        self.needs_update.clone()
    }

    /// Fetch, map and publish.
    ///
    /// A fetch failure leaves the store untouched. Records that fail mapping
    /// are skipped and reported; a stored version of a skipped record is kept
    /// as it was. An empty result over a populated store is refused unless
    /// `allow_empty_replace` is set.
    pub async fn reconcile(&self) -> BeaconResult<ReconcileReport> {
        let started = Instant::now();

        let raw = match self.source.fetch_all().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "content fetch failed, store unchanged");
                return Err(e.into());
            }
        };

        let mut report = ReconcileReport {
            fetched: raw.len(),
            ..Default::default()
        };

        let mut seen = HashSet::with_capacity(raw.len());
        let mut drafts = Vec::with_capacity(raw.len());
        let mut unmapped = HashSet::new();
        for record in &raw {
            let mapped = self.mapping.map(record).and_then(|draft| {
                if seen.insert(draft.external_id.clone()) {
                    Ok(draft)
                } else {
                    Err(MappingError::DuplicateExternalId {
                        external_id: draft.external_id,
                    })
                }
            });
            match mapped {
                Ok(draft) => drafts.push(draft),
                Err(e) => {
                    warn!(external_id = %record.external_id, error = %e, "record skipped");
                    if !matches!(e, MappingError::DuplicateExternalId { .. }) {
                        unmapped.insert(record.external_id.clone());
                    }
                    report.skipped += 1;
                    report.errors.push(e);
                }
            }
        }

        let existing = self.store.len();
        if drafts.is_empty() && existing > 0 && !self.allow_empty_replace {
            warn!(existing, fetched = report.fetched, "refusing to replace store with an empty set");
            return Err(SourceError::EmptyResult { existing }.into());
        }

        let outcome = self.store.replace_all_retaining(drafts, &unmapped);
        report.inserted = outcome.inserted;
        report.updated = outcome.updated;
        report.retained = outcome.retained;
        report.removed = outcome.removed;
        report.duration = started.elapsed();

        self.needs_update.store(true, Ordering::Release);

        info!(
            source = self.source.name(),
            fetched = report.fetched,
            inserted = report.inserted,
            updated = report.updated,
            removed = report.removed,
            skipped = report.skipped,
            retained = report.retained,
            duration_ms = report.duration.as_millis() as u64,
            "reconciliation complete"
        );
        Ok(report)
    }
}
