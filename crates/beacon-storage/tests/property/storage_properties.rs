//! Property tests: replace idempotence, id stability, ids never reused.

use std::collections::HashSet;

use proptest::prelude::*;

use beacon_core::models::RecordDraft;
use beacon_storage::RecordStore;

fn make_draft(external_id: &str, name: &str) -> RecordDraft {
    RecordDraft {
        external_id: external_id.to_string(),
        name: name.to_string(),
        summary: format!("about {name}"),
        ..Default::default()
    }
}

fn drafts_strategy() -> impl Strategy<Value = Vec<RecordDraft>> {
    prop::collection::vec(("[a-f]{1,2}", "[A-Za-z ]{1,12}"), 0..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(ext, name)| make_draft(&ext, &name))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_replace_is_idempotent(drafts in drafts_strategy()) {
        let store = RecordStore::new();
        store.replace_all(drafts.clone());
        let first: Vec<_> = store.all().into_iter().map(|r| (r.id, r.to_draft())).collect();

        let outcome = store.replace_all(drafts);
        let second: Vec<_> = store.all().into_iter().map(|r| (r.id, r.to_draft())).collect();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(outcome.inserted, 0);
        prop_assert_eq!(outcome.updated, 0);
        prop_assert_eq!(outcome.removed, 0);
        prop_assert_eq!(outcome.unchanged, first.len());
    }

    #[test]
    fn prop_store_holds_unique_external_ids(drafts in drafts_strategy()) {
        let store = RecordStore::new();
        store.replace_all(drafts.clone());
        let distinct: HashSet<_> = drafts.iter().map(|d| d.external_id.clone()).collect();
        prop_assert_eq!(store.len(), distinct.len());
    }

    #[test]
    fn prop_ids_never_reused(rounds in prop::collection::vec(drafts_strategy(), 1..6)) {
        let store = RecordStore::new();
        let mut retired = HashSet::new();
        let mut live: HashSet<_> = HashSet::new();

        for drafts in rounds {
            store.replace_all(drafts);
            let now: HashSet<_> = store.all().into_iter().map(|r| r.id).collect();
            for id in &now {
                prop_assert!(!retired.contains(id), "id {} was reused", id);
            }
            retired.extend(live.difference(&now).copied());
            live = now;
        }
    }
}
