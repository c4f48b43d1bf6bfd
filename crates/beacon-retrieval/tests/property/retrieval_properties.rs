//! Property tests: cosine bounds and symmetry, ranking order, stability and
//! threshold fallback.

use proptest::prelude::*;

use beacon_core::models::{EmbeddedRecord, Record, RecordDraft, RecordId};
use beacon_retrieval::{cosine_similarity, SimilarityRanker};
use chrono::Utc;

const DIMS: usize = 8;

fn vector() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0, DIMS)
}

fn make_entry(id: u64, vector: Vec<f32>) -> EmbeddedRecord {
    let draft = RecordDraft {
        external_id: format!("ext-{id}"),
        name: format!("r{id}"),
        ..Default::default()
    };
    EmbeddedRecord {
        record: Record::from_draft(RecordId(id), draft, Utc::now()),
        vector,
        text_hash: String::new(),
    }
}

proptest! {
    #[test]
    fn prop_cosine_in_bounds(a in vector(), b in vector()) {
        let sim = cosine_similarity(&a, &b);
        prop_assert!((-1.0..=1.0).contains(&sim), "sim = {}", sim);
    }

    #[test]
    fn prop_cosine_symmetric(a in vector(), b in vector()) {
        prop_assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn prop_zero_vector_scores_zero(a in vector()) {
        prop_assert_eq!(cosine_similarity(&a, &[0.0; DIMS]), 0.0);
    }

    #[test]
    fn prop_ranking_is_descending(
        query in vector(),
        vectors in prop::collection::vec(vector(), 0..30),
        threshold in -1.0f64..1.0,
        top_k in 0usize..40,
    ) {
        let embedded: Vec<_> = vectors.into_iter().enumerate()
            .map(|(i, v)| make_entry(i as u64, v)).collect();
        let ranked = SimilarityRanker::new(threshold, top_k).rank(&query, &embedded, top_k).unwrap();

        prop_assert!(ranked.len() <= top_k);
        prop_assert!(ranked.len() <= embedded.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn prop_threshold_or_fallback(
        query in vector(),
        vectors in prop::collection::vec(vector(), 1..30),
        threshold in -1.0f64..1.0,
    ) {
        let embedded: Vec<_> = vectors.into_iter().enumerate()
            .map(|(i, v)| make_entry(i as u64, v)).collect();
        let n = embedded.len();
        let ranked = SimilarityRanker::new(threshold, n).rank(&query, &embedded, n).unwrap();

        let passing = embedded.iter()
            .filter(|e| cosine_similarity(&query, &e.vector) >= threshold)
            .count();
        if passing == 0 {
            prop_assert_eq!(ranked.len(), n);
        } else {
            prop_assert_eq!(ranked.len(), passing);
            prop_assert!(ranked.iter().all(|r| r.score >= threshold));
        }
    }

    #[test]
    fn prop_ties_keep_input_order(
        query in vector(),
        copies in 2usize..10,
    ) {
        let embedded: Vec<_> = (0..copies).map(|i| make_entry(i as u64, query.clone())).collect();
        let ranked = SimilarityRanker::new(-1.0, copies).rank(&query, &embedded, copies).unwrap();
        let ids: Vec<u64> = ranked.iter().map(|r| r.record.id.0).collect();
        prop_assert_eq!(ids, (0..copies as u64).collect::<Vec<_>>());
    }
}
