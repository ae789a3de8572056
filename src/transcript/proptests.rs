//! Property-based tests for the message model
//!
//! - Title derivation is idempotent and never panics
//! - Records round-trip every field
//! - The store keeps insertion order

use super::message::*;
use super::store::TranscriptStore;
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{Map, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_origin() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_ .-]{0,30}",
        "([a-z]{1,8}/){0,3}[A-Za-z_]{1,16}\\.(txt|pdf|docx)",
        "([a-z]{1,8}\\\\){0,3}[A-Za-z_-]{1,16}\\.(txt|pdf)",
        "[a-zßﬁﬂŉİǅΐäöüçéøł_ .-]{0,30}",
        "\\PC{0,30}",
    ]
}

fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
        Utc.timestamp_opt(secs, nanos)
            .single()
            .unwrap_or_else(Utc::now)
    })
}

fn arb_source() -> impl Strategy<Value = Source> {
    (arb_origin(), "[a-zA-Z0-9 ,.]{0,60}", "[a-z_]{0,12}")
        .prop_map(|(origin, content, category)| Source::new(origin, content, category))
}

fn arb_metadata() -> impl Strategy<Value = Option<Map<String, Value>>> {
    proptest::option::of(
        proptest::collection::hash_map("[a-z_]{1,10}", "[a-zA-Z0-9 ]{0,20}", 0..4).prop_map(|m| {
            m.into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect::<Map<String, Value>>()
        }),
    )
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        ("\\PC{0,80}", arb_timestamp()).prop_map(|(text, at)| Message::user(text, at)),
        (
            "\\PC{0,80}",
            proptest::collection::vec(arb_source(), 0..4),
            arb_metadata(),
            arb_timestamp()
        )
            .prop_map(|(text, sources, metadata, at)| Message::assistant(
                text, sources, metadata, at
            )),
        ("[a-zA-Z ]{0,40}", arb_timestamp()).prop_map(|(text, at)| Message::error(text, at)),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_title_idempotent(origin in arb_origin()) {
        let once = derive_title(&origin);
        prop_assert_eq!(derive_title(&once), once);
    }

    #[test]
    fn prop_title_has_no_separators(origin in arb_origin()) {
        let title = derive_title(&origin);
        prop_assert!(!title.contains('/'));
        prop_assert!(!title.contains('\\'));
        prop_assert!(!title.contains('_'));
        prop_assert!(!title.starts_with(' ') && !title.ends_with(' '));
    }

    #[test]
    fn prop_record_round_trip(msg in arb_message()) {
        let record = msg.to_record().unwrap();
        let back = Message::from_record(&record);
        prop_assert_eq!(back, Ok(msg));
    }

    #[test]
    fn prop_store_keeps_insertion_order(msgs in proptest::collection::vec(arb_message(), 0..12)) {
        let store = TranscriptStore::new();
        for msg in &msgs {
            store.append(msg.clone());
        }
        prop_assert_eq!(store.snapshot().messages, msgs);
    }
}
