//! Property-based tests for core components using proptest.

use proptest::prelude::*;

use scout_core::aggregate::{aggregate, render_record};
use scout_core::evidence::{MISSING_LINK, MISSING_SNIPPET, MISSING_TITLE, normalize_hit};
use scout_core::fixtures::FixtureTable;
use scout_core::synthesis::contains_sentinel;
use scout_core::types::EvidenceRecord;

fn record_strategy() -> impl Strategy<Value = EvidenceRecord> {
    ("[a-zA-Z0-9 ]{0,30}", "[a-zA-Z0-9 .,]{0,60}", "https://[a-z]{1,12}\\.com")
        .prop_map(|(t, s, l)| EvidenceRecord::new(t, s, l))
}

// --- Aggregator properties ---

proptest! {
    #[test]
    fn aggregate_concatenates_in_input_order(
        records in prop::collection::vec(record_strategy(), 0..12)
    ) {
        let mut expected = String::new();
        for r in &records {
            render_record(&mut expected, r);
        }
        prop_assert_eq!(aggregate(&records), expected);
    }

    #[test]
    fn aggregate_is_deterministic(
        records in prop::collection::vec(record_strategy(), 0..12)
    ) {
        prop_assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[test]
    fn aggregate_splits_at_any_point(
        records in prop::collection::vec(record_strategy(), 0..12),
        split in 0usize..12,
    ) {
        let split = split.min(records.len());
        let (head, tail) = records.split_at(split);
        prop_assert_eq!(
            aggregate(&records),
            format!("{}{}", aggregate(head), aggregate(tail))
        );
    }

    #[test]
    fn aggregate_has_one_block_per_record(
        records in prop::collection::vec(record_strategy(), 0..12)
    ) {
        let corpus = aggregate(&records);
        prop_assert_eq!(corpus.matches("Title: ").count(), records.len());
        prop_assert_eq!(corpus.matches("\nSource: ").count(), records.len());
    }
}

// --- Fixture short-circuit properties ---

proptest! {
    #[test]
    fn any_query_with_trigger_hits_fixture(
        prefix in "[a-z ]{0,10}",
        suffix in "[a-z ]{0,10}",
        trigger in prop::sample::select(vec!["adith", "ADITH", "Cet", "demo", "DeMo"]),
    ) {
        let table = FixtureTable::seeded();
        let query = format!("{}{}{}", prefix, trigger, suffix);
        let hit = table.lookup(&query);
        prop_assert!(hit.is_some());
        prop_assert_eq!(hit, table.lookup("demo"));
    }
}

// --- Normalization properties ---

proptest! {
    #[test]
    fn normalize_never_yields_blank_fields(
        title in prop::option::of("[ a-z]{0,8}"),
        body in prop::option::of("[ a-z]{0,8}"),
        href in prop::option::of("[ a-z]{0,8}"),
    ) {
        let mut item = serde_json::Map::new();
        if let Some(t) = &title { item.insert("title".into(), t.clone().into()); }
        if let Some(b) = &body { item.insert("body".into(), b.clone().into()); }
        if let Some(h) = &href { item.insert("href".into(), h.clone().into()); }

        let record = normalize_hit(&serde_json::Value::Object(item));
        prop_assert!(!record.title().trim().is_empty());
        prop_assert!(!record.snippet().trim().is_empty());
        prop_assert!(!record.source_link().trim().is_empty());

        if title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            prop_assert_eq!(record.title(), MISSING_TITLE);
        }
        if body.as_deref().is_none_or(|b| b.trim().is_empty()) {
            prop_assert_eq!(record.snippet(), MISSING_SNIPPET);
        }
        if href.as_deref().is_none_or(|h| h.trim().is_empty()) {
            prop_assert_eq!(record.source_link(), MISSING_LINK);
        }
    }

    #[test]
    fn sentinel_detected_regardless_of_padding(
        before in "[ \n\t]{0,5}",
        after in "[ \n\t]{0,5}",
    ) {
        let reply = format!("{}NO_MATCH_FOUND{}", before, after);
        prop_assert!(contains_sentinel(&reply));
    }
}
