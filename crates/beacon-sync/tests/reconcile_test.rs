//! ContentReconciler: idempotence, failure isolation, mapping errors,
//! empty-fetch guard, id preservation and the stale flag.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use beacon_core::config::SyncConfig;
use beacon_core::errors::{BeaconError, MappingError, SourceError};
use beacon_core::models::raw_record::FieldValue;
use beacon_core::models::{RawRecord, UsageKind, Visibility};
use beacon_core::traits::IContentSource;
use beacon_storage::RecordStore;
use beacon_sync::ContentReconciler;

/// Scripted source: returns the current record set, or fails when told to.
struct ScriptedSource {
    records: Mutex<Vec<RawRecord>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(records: Vec<RawRecord>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    fn set_records(&self, records: Vec<RawRecord>) {
        *self.records.lock().unwrap() = records;
    }
}

#[async_trait]
impl IContentSource for ScriptedSource {
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Unreachable {
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.records.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn raw(external_id: &str, name: &str) -> RawRecord {
    RawRecord::new(external_id)
        .with_field("Name", FieldValue::Text(name.to_string()))
        .with_field("Summary", FieldValue::Text(format!("About {name}")))
}

fn setup(records: Vec<RawRecord>) -> (Arc<ScriptedSource>, Arc<RecordStore>, ContentReconciler) {
    let source = ScriptedSource::new(records);
    let store = Arc::new(RecordStore::new());
    let reconciler = ContentReconciler::new(source.clone(), store.clone(), &SyncConfig::default());
    (source, store, reconciler)
}

fn external_ids(store: &RecordStore) -> Vec<String> {
    let mut ids: Vec<_> = store.all().into_iter().map(|r| r.external_id).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn reconciling_twice_is_idempotent() {
    let (_source, store, reconciler) = setup(test_fixtures::portal_raw_records());

    let first = reconciler.reconcile().await.unwrap();
    let ids_after_first = external_ids(&store);
    let count_after_first = store.len();

    let second = reconciler.reconcile().await.unwrap();
    assert_eq!(store.len(), count_after_first);
    assert_eq!(external_ids(&store), ids_after_first);
    assert!(first.changed());
    assert!(!second.changed());
    assert_eq!(second.inserted + second.updated + second.removed, 0);
}

#[tokio::test]
async fn portal_export_maps_valid_records_and_skips_bad_ones() {
    let (_source, store, reconciler) = setup(test_fixtures::portal_raw_records());
    let report = reconciler.reconcile().await.unwrap();

    assert_eq!(report.fetched, 10);
    assert_eq!(report.inserted, 8);
    assert_eq!(report.skipped, 2);
    assert_eq!(store.len(), 8);
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, MappingError::MissingField { external_id, .. } if external_id == "src-009")));
    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, MappingError::InvalidValue { external_id, .. } if external_id == "src-010")));

    let case_study = store.get_by_external_id("src-003").unwrap();
    assert_eq!(case_study.name, "Port Authority Case Study");
    assert_eq!(case_study.category, "Case Study");
    assert_eq!(case_study.visibility, Visibility::Internal);
    assert_eq!(case_study.tags.product, vec!["Smart Mooring", "Berth Monitor"]);
}

#[tokio::test]
async fn fetch_failure_leaves_store_untouched() {
    let (source, store, reconciler) = setup(vec![raw("a", "Alpha"), raw("b", "Beta")]);
    reconciler.reconcile().await.unwrap();
    let version = store.version();

    source.fail.store(true, Ordering::SeqCst);
    let err = reconciler.reconcile().await.unwrap_err();
    assert!(matches!(err, BeaconError::Source(SourceError::Unreachable { .. })));
    assert!(err.is_retryable());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.len(), 2);
    assert_eq!(store.version(), version);
}

#[tokio::test]
async fn empty_fetch_over_populated_store_is_refused() {
    let (source, store, reconciler) = setup(vec![raw("a", "Alpha")]);
    reconciler.reconcile().await.unwrap();

    source.set_records(vec![]);
    let err = reconciler.reconcile().await.unwrap_err();
    assert!(matches!(err, BeaconError::Source(SourceError::EmptyResult { existing: 1 })));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn empty_fetch_allowed_when_configured() {
    let source = ScriptedSource::new(vec![raw("a", "Alpha")]);
    let store = Arc::new(RecordStore::new());
    let config = SyncConfig {
        allow_empty_replace: true,
        ..Default::default()
    };
    let reconciler = ContentReconciler::new(source.clone(), store.clone(), &config);
    reconciler.reconcile().await.unwrap();

    source.set_records(vec![]);
    let report = reconciler.reconcile().await.unwrap();
    assert_eq!(report.removed, 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn empty_fetch_into_empty_store_is_fine() {
    let (_source, store, reconciler) = setup(vec![]);
    let report = reconciler.reconcile().await.unwrap();
    assert_eq!(report.fetched, 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn duplicate_external_id_first_wins() {
    let (_source, store, reconciler) = setup(vec![raw("a", "First"), raw("a", "Second")]);
    let report = reconciler.reconcile().await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get_by_external_id("a").unwrap().name, "First");
    assert_eq!(report.skipped, 1);
    assert!(matches!(report.errors[0], MappingError::DuplicateExternalId { .. }));
}

#[tokio::test]
async fn surviving_records_keep_ids_and_usage() {
    let (source, store, reconciler) = setup(vec![raw("a", "Alpha"), raw("b", "Beta")]);
    reconciler.reconcile().await.unwrap();
    let a = store.get_by_external_id("a").unwrap().id;
    store.increment_usage(a, UsageKind::View).unwrap();
    store.increment_usage(a, UsageKind::Share).unwrap();

    source.set_records(vec![raw("a", "Alpha (revised)"), raw("c", "Gamma")]);
    let report = reconciler.reconcile().await.unwrap();
    assert_eq!((report.inserted, report.updated, report.removed), (1, 1, 1));

    let after = store.get_by_external_id("a").unwrap();
    assert_eq!(after.id, a);
    assert_eq!(after.name, "Alpha (revised)");
    assert_eq!(after.usage.total(), 2);
    assert!(store.get_by_external_id("b").is_none());
}

#[tokio::test]
async fn success_marks_index_stale_and_failure_does_not() {
    let flag = Arc::new(AtomicBool::new(false));
    let source = ScriptedSource::new(vec![raw("a", "Alpha")]);
    let store = Arc::new(RecordStore::new());
    let reconciler = ContentReconciler::new(source.clone(), store, &SyncConfig::default())
        .with_stale_flag(flag.clone());

    source.fail.store(true, Ordering::SeqCst);
    assert!(reconciler.reconcile().await.is_err());
    assert!(!flag.load(Ordering::SeqCst));

    source.fail.store(false, Ordering::SeqCst);
    reconciler.reconcile().await.unwrap();
    assert!(flag.load(Ordering::SeqCst));
}

#[tokio::test]
async fn field_aliases_from_config_are_used() {
    let source = ScriptedSource::new(vec![RawRecord::new("x")
        .with_field("Headline", FieldValue::Text("Aliased Name".into()))]);
    let store = Arc::new(RecordStore::new());
    let mut config = SyncConfig::default();
    config
        .field_aliases
        .insert("name".to_string(), vec!["Headline".to_string()]);
    let reconciler = ContentReconciler::new(source, store.clone(), &config);

    reconciler.reconcile().await.unwrap();
    assert_eq!(store.get_by_external_id("x").unwrap().name, "Aliased Name");
}

#[tokio::test]
async fn records_failing_mapping_keep_their_stored_version() {
    let (source, store, reconciler) = setup(vec![
        raw("a", "Alpha"),
        raw("b", "Beta"),
        raw("c", "Gamma"),
        raw("d", "Delta"),
    ]);
    reconciler.reconcile().await.unwrap();
    let beta = store.get_by_external_id("b").unwrap();
    store.increment_usage(beta.id, UsageKind::View).unwrap();
    store.increment_usage(beta.id, UsageKind::Share).unwrap();

    // b and c come back under a renamed field; d is gone from the source.
    let renamed = |external_id: &str, name: &str| {
        RawRecord::new(external_id)
            .with_field("Headline", FieldValue::Text(name.to_string()))
            .with_field("Summary", FieldValue::Text(format!("About {name}")))
    };
    source.set_records(vec![
        raw("a", "Alpha"),
        renamed("b", "Beta v2"),
        renamed("c", "Gamma v2"),
    ]);
    let report = reconciler.reconcile().await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.retained, 2);
    assert_eq!(report.removed, 1);
    assert_eq!(external_ids(&store), vec!["a", "b", "c"]);

    let kept = store.get_by_external_id("b").unwrap();
    assert_eq!(kept.id, beta.id);
    assert_eq!(kept.name, "Beta");
    assert_eq!(kept.summary, "About Beta");
    assert_eq!(kept.usage.total(), 2);
    assert!(store.get_by_external_id("d").is_none());
}

#[tokio::test]
async fn unmapped_record_never_seen_before_is_not_invented() {
    let (source, store, reconciler) = setup(vec![raw("a", "Alpha")]);
    reconciler.reconcile().await.unwrap();

    source.set_records(vec![
        raw("a", "Alpha"),
        RawRecord::new("new").with_field("Headline", FieldValue::Text("No name".into())),
    ]);
    let report = reconciler.reconcile().await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.retained, 0);
    assert_eq!(external_ids(&store), vec!["a"]);
}
