//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against its invariants: capacity bound,
//! LRU order, absolute TTL, segment-exact invalidation and read-only
//! reporting.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::audit::{AuditEventType, MemoryAuditSink};
use crate::cache::key::matches_entity;
use crate::cache::{CacheKey, CacheStore, ComplianceReporter, ManualClock};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: Duration = Duration::from_millis(300_000);

// == Strategies ==
/// Generates structured keys from a small alphabet so that namespaces and
/// ids collide often.
fn scoped_key_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["cases", "cases1", "evidence", "user", "notes"]),
        prop::sample::select(vec!["1", "12", "123", "456"]),
        "[a-z0-9]{1,4}",
    )
        .prop_map(|(ns, id, tail)| format!("{}:{}:{}", ns, id, tail))
}

/// Generates arbitrary keys, including ones with no delimiter at all.
fn any_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![scoped_key_strategy(), "[a-zA-Z0-9_:]{0,24}"]
}

/// Generates plaintext values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (scoped_key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        scoped_key_strategy().prop_map(|key| CacheOp::Get { key }),
        scoped_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn fill(store: &mut CacheStore, entries: &[(String, String)]) -> HashMap<String, String> {
    let mut expected = HashMap::new();
    for (key, value) in entries {
        store.set(key.as_str(), value.as_str());
        expected.insert(key.clone(), value.clone());
    }
    expected
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a pair and reading it back inside the TTL window returns the
    // exact value.
    #[test]
    fn prop_roundtrip_storage(key in any_key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);

        store.set(key.as_str(), value.as_str());
        prop_assert_eq!(store.get(&key), Some(value));
    }

    // A second write under the same key replaces the first and never adds
    // an entry.
    #[test]
    fn prop_overwrite_semantics(
        key in any_key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);

        store.set(key.as_str(), value1);
        store.set(key.as_str(), value2.as_str());

        prop_assert_eq!(store.get(&key), Some(value2));
        prop_assert_eq!(store.len(), 1);
    }

    // No sequence of writes pushes the cache past its bound.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((any_key_strategy(), value_strategy()), 1..200),
        max_entries in 1usize..20
    ) {
        let mut store = CacheStore::new(max_entries, TEST_TTL);

        for (key, value) in entries {
            store.set(key, value);
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // The set of surviving keys always matches a straightforward
    // recency-list model of LRU.
    #[test]
    fn prop_lru_matches_reference_model(
        ops in prop::collection::vec(cache_op_strategy(), 1..120),
        capacity in 1usize..8
    ) {
        let mut store = CacheStore::new(capacity, TEST_TTL);
        // Front = least recently used
        let mut model: VecDeque<String> = VecDeque::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.as_str(), value);
                    model.retain(|k| k != &key);
                    model.push_back(key);
                    while model.len() > capacity {
                        model.pop_front();
                    }
                }
                CacheOp::Get { key } => {
                    let hit = store.get(&key).is_some();
                    let in_model = model.contains(&key);
                    prop_assert_eq!(hit, in_model, "hit/miss diverged for {}", key);
                    if in_model {
                        model.retain(|k| k != &key);
                        model.push_back(key);
                    }
                }
                CacheOp::Delete { key } => {
                    let removed = store.delete(&key);
                    prop_assert_eq!(removed, model.contains(&key));
                    model.retain(|k| k != &key);
                }
            }
        }

        let expected: HashSet<&String> = model.iter().collect();
        prop_assert_eq!(store.len(), expected.len());
        for key in expected {
            prop_assert!(store.contains_key(key), "{} should have survived", key);
        }
    }

    // Entity invalidation removes exactly the keys whose first two segments
    // match and nothing else.
    #[test]
    fn prop_invalidate_entity_is_exact(
        entries in prop::collection::vec((scoped_key_strategy(), value_strategy()), 1..40),
        namespace in prop::sample::select(vec!["cases", "evidence", "user"]),
        id in prop::sample::select(vec!["1", "12", "123"])
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        let expected = fill(&mut store, &entries);

        let matching = expected
            .keys()
            .filter(|k| matches_entity(k, namespace, id))
            .count();
        prop_assert_eq!(store.invalidate_entity(namespace, id), matching);

        for (key, value) in &expected {
            let parsed = CacheKey::parse(key);
            if parsed.namespace == namespace && parsed.scope.as_deref() == Some(id) {
                prop_assert!(!store.contains_key(key));
            } else {
                prop_assert_eq!(store.get(key), Some(value.clone()));
            }
        }
    }

    // Namespace invalidation never touches a key whose first segment merely
    // starts with the namespace.
    #[test]
    fn prop_invalidate_entity_type_is_exact(
        entries in prop::collection::vec((scoped_key_strategy(), value_strategy()), 1..40),
        namespace in prop::sample::select(vec!["cases", "cases1", "notes"])
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        let expected = fill(&mut store, &entries);

        store.invalidate_entity_type(namespace);

        for key in expected.keys() {
            let first = key.split(':').next().unwrap_or_default();
            prop_assert_eq!(store.contains_key(key), first != namespace);
        }
    }

    // Erasure removes exactly the subject's keys, records one event, and a
    // report afterwards is empty.
    #[test]
    fn prop_erasure_then_report_is_empty(
        entries in prop::collection::vec((scoped_key_strategy(), value_strategy()), 1..40),
        subject in prop::sample::select(vec!["1", "12", "123", "456"])
    ) {
        let sink = Arc::new(MemoryAuditSink::new());
        let mut store = CacheStore::builder()
            .max_entries(TEST_MAX_ENTRIES)
            .audit_sink(sink.clone())
            .build();
        let expected = fill(&mut store, &entries);
        let others = expected
            .keys()
            .filter(|k| !matches_entity(k, "user", subject))
            .count();

        store.clear_user_data(subject);

        prop_assert_eq!(store.len(), others);
        prop_assert!(store.user_cache_report(subject).is_empty());
        prop_assert_eq!(sink.events_of(AuditEventType::GdprErasure).len(), 1);
    }

    // A report lists every live subject entry with its byte size and leaves
    // the store exactly as it was.
    #[test]
    fn prop_report_is_read_only(
        entries in prop::collection::vec((scoped_key_strategy(), value_strategy()), 1..40),
        subject in prop::sample::select(vec!["1", "123", "456"])
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        let expected = fill(&mut store, &entries);
        let stats_before = store.stats();

        let report = store.user_cache_report(subject);

        prop_assert_eq!(store.stats(), stats_before);
        let owned: Vec<(&String, &String)> = expected
            .iter()
            .filter(|(k, _)| matches_entity(k, "user", subject))
            .collect();
        prop_assert_eq!(report.len(), owned.len());
        for item in &report {
            prop_assert_eq!(item.size, expected[&item.key].len());
        }
    }

    // Once the TTL has elapsed from the last write, every read misses, no
    // matter how often the entry was read before.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in any_key_strategy(),
        value in value_strategy(),
        reads in 0usize..5,
        overshoot_ms in 0u64..1_000_000
    ) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let mut store = CacheStore::builder()
            .ttl(TEST_TTL)
            .clock(clock.clone())
            .build();

        store.set(key.as_str(), value.as_str());
        for _ in 0..reads {
            prop_assert_eq!(store.get(&key), Some(value.clone()));
            clock.advance(Duration::from_millis(1_000));
        }

        clock.set(1_700_000_000_000 + TEST_TTL.as_millis() as u64 + overshoot_ms);
        prop_assert_eq!(store.get(&key), None);
        prop_assert_eq!(store.get(&key), None);
    }
}

// == Property Test for Error Response Format ==
// Exercises the CacheError -> HTTP response conversion.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error becomes a JSON body with a string "error" field.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::NotFound(error_msg.clone()),
            CacheError::InvalidRequest(error_msg.clone()),
        ];

        let rt = tokio::runtime::Runtime::new().unwrap();
        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = rt.block_on(async { to_bytes(response.into_body(), usize::MAX).await.unwrap() });
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

            let error_value = json.get("error").and_then(|v| v.as_str());
            prop_assert_eq!(error_value, Some(expected_msg.as_str()));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
// Shares one store across tasks behind the same lock the server uses.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent reads only ever observe values that some writer stored for
    // that key, and the bound holds afterwards.
    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..60)
    ) {
        use tokio::sync::RwLock;

        let written: HashMap<String, HashSet<String>> = operations.iter().fold(
            HashMap::new(),
            |mut acc, op| {
                if let CacheOp::Set { key, value } = op {
                    acc.entry(key.clone()).or_default().insert(value.clone());
                }
                acc
            },
        );
        let written = Arc::new(written);

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = Arc::new(RwLock::new(CacheStore::new(16, TEST_TTL)));
            let mut handles = vec![];

            for op in operations {
                let store = Arc::clone(&store);
                let written = Arc::clone(&written);

                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Set { key, value } => {
                            store.write().await.set(key, value);
                            Ok(())
                        }
                        CacheOp::Get { key } => {
                            let value = store.write().await.get(&key);
                            match value {
                                Some(v) if !written.get(&key).is_some_and(|vs| vs.contains(&v)) => {
                                    Err(format!("Read unexpected value for '{}'", key))
                                }
                                _ => Ok(()),
                            }
                        }
                        CacheOp::Delete { key } => {
                            store.write().await.delete(&key);
                            Ok(())
                        }
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.unwrap();
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            let stats = store.read().await.stats();
            prop_assert!(stats.size <= 16, "Cache should not exceed max entries");
            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate));
            Ok(())
        })?;
    }
}
