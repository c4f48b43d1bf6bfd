//! Test fixture loader for Beacon record sets and integration scenarios.
//!
//! Fixture JSON lives under `data/` in this crate, so the paths resolve the
//! same way from every crate in the workspace.

use std::path::{Path, PathBuf};

use beacon_core::models::{RawRecord, RecordDraft, TagSet, Visibility};
use serde::de::DeserializeOwned;

/// Root directory of the fixture data.
fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// A realistic portal export: mixed types, tags, visibility and dates, one
/// record with no name and one with an invalid visibility literal.
pub fn portal_raw_records() -> Vec<RawRecord> {
    load_fixture("records/portal_records.json")
}

/// The two-record Smart Mooring / Weather Buoy scenario.
pub fn smart_mooring_raw_records() -> Vec<RawRecord> {
    load_fixture("records/smart_mooring.json")
}

/// `count` drafts sharing `category` and a "Mooring" product tag, with
/// external ids `rec-000`, `rec-001`, ...
pub fn numbered_drafts(count: usize, category: &str) -> Vec<RecordDraft> {
    (0..count)
        .map(|i| RecordDraft {
            external_id: format!("rec-{i:03}"),
            name: format!("{category} {i:03}"),
            category: category.to_string(),
            tags: TagSet {
                product: vec!["Mooring".to_string()],
                ..Default::default()
            },
            visibility: Visibility::Both,
            summary: format!("Summary for {category} number {i}"),
            link: format!("https://portal.example.com/r/{i}"),
            ..Default::default()
        })
        .collect()
}
