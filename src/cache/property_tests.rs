//! Property-Based Tests for the Cache Engine
//!
//! Uses proptest to verify the engine's structural guarantees over arbitrary
//! operation sequences. All time comes from a manual clock, so no test here
//! sleeps.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::Cache;
use crate::clock::ManualClock;
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_MAX_COUNT: usize = 100;

fn test_cache(config: CacheConfig) -> Cache<String> {
    Cache::with_clock(config, Arc::new(ManualClock::new(0))).unwrap()
}

// == Strategies ==
/// Generates valid cache keys.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}"
}

/// Generates cache values of bounded size.
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,8}"
}

/// A single cache operation for sequence-driven properties.
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, hit/miss/lookup counters exactly track
    // the get outcomes, and hit_rate stays within [0, 1].
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut cache = test_cache(
            CacheConfig::new().max_count(TEST_MAX_COUNT).enable_stats(true),
        );
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut expected_gets: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => cache.set(key, value),
                CacheOp::Get { key } => {
                    expected_gets += 1;
                    match cache.get(&key) {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
                CacheOp::Delete { key } => {
                    cache.remove(&key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.hits + stats.misses, expected_gets, "Lookup count mismatch");
        prop_assert!((0.0..=1.0).contains(&stats.hit_rate()));
    }

    // Storing a pair and reading it back (no TTL involved) returns the exact
    // value that was stored.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut cache = test_cache(CacheConfig::new().max_count(TEST_MAX_COUNT));

        cache.set(key.clone(), value.clone());
        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // After a delete, the key reads as absent; a second delete reports false.
    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let mut cache = test_cache(CacheConfig::new().max_count(TEST_MAX_COUNT));

        cache.set(key.clone(), value);
        prop_assert!(cache.remove(&key));
        prop_assert_eq!(cache.get(&key), None);
        prop_assert!(!cache.remove(&key));
    }

    // Overwriting a key keeps a single entry holding the latest value.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut cache = test_cache(CacheConfig::new().max_count(TEST_MAX_COUNT));

        cache.set(key.clone(), value1);
        cache.set(key.clone(), value2.clone());

        prop_assert_eq!(cache.get(&key), Some(value2));
        prop_assert_eq!(cache.len(), 1);
    }

    // The entry count never exceeds max_count after any set, and with unique
    // keys and no intervening gets, the survivors are the last max_count keys.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200)
    ) {
        let max_count = 10;
        let mut cache = test_cache(CacheConfig::new().max_count(max_count));

        for (key, value) in &entries {
            cache.set(key.clone(), value.clone());
            prop_assert!(cache.len() <= max_count);
        }
    }

    #[test]
    fn prop_last_distinct_keys_survive(
        keys in prop::collection::vec(key_strategy(), 1..60)
    ) {
        let max_count = 5;
        let mut cache = test_cache(CacheConfig::new().max_count(max_count));

        // Deduplicate, preserving order, so every insert is a fresh key
        let mut seen = HashSet::new();
        let unique: Vec<String> = keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();

        for key in &unique {
            cache.set(key.clone(), "v".to_string());
        }

        let expected: HashSet<&String> = unique
            .iter()
            .rev()
            .take(max_count)
            .collect();
        let resident: HashSet<String> = cache.keys().into_iter().collect();

        prop_assert_eq!(resident.len(), expected.len());
        for key in expected {
            prop_assert!(resident.contains(key), "Key '{}' should be resident", key);
        }
    }

    // The total of estimated sizes never exceeds the memory limit after an
    // insert, as long as no single value is larger than the limit itself.
    #[test]
    fn prop_memory_bound_holds(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..100)
    ) {
        let limit = 32; // every generated value is at most 8 bytes
        let mut cache = test_cache(CacheConfig::new().max_memory_bytes(limit))
            .with_size_of(|v: &String| v.len());

        for (key, value) in entries {
            cache.set(key, value);
            prop_assert!(
                cache.memory_used() <= limit,
                "memory {} exceeds limit {}",
                cache.memory_used(),
                limit
            );
        }
    }

    // A snapshot round trip reproduces the resident key set, the values, and
    // the recency order.
    #[test]
    fn prop_snapshot_round_trip(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let clock = ManualClock::new(0);
        let mut cache: Cache<String> = Cache::with_clock(
            CacheConfig::new().max_count(10),
            Arc::new(clock.clone()),
        ).unwrap();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => cache.set(key, value),
                CacheOp::Get { key } => {
                    let _ = cache.get(&key);
                }
                CacheOp::Delete { key } => {
                    cache.remove(&key);
                }
            }
        }

        let snapshot = cache.to_snapshot();
        let mut restored: Cache<String> =
            Cache::from_snapshot_with_clock(snapshot, Arc::new(clock)).unwrap();

        prop_assert_eq!(restored.entries(), cache.entries());
    }

    // An accessed key is never the next eviction victim.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::vec(key_strategy(), 3..8),
        new_key in key_strategy()
    ) {
        let mut seen = HashSet::new();
        let unique: Vec<String> = keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();
        prop_assume!(unique.len() >= 3);
        prop_assume!(!unique.contains(&new_key));

        let capacity = unique.len();
        let mut cache = test_cache(CacheConfig::new().max_count(capacity));

        for key in &unique {
            cache.set(key.clone(), "v".to_string());
        }

        // Touch the current LRU candidate, making the second-oldest the victim
        let accessed = unique[0].clone();
        let expected_victim = unique[1].clone();
        let _ = cache.get(&accessed);

        cache.set(new_key.clone(), "v".to_string());

        prop_assert!(cache.has(&accessed), "Accessed key '{}' should survive", accessed);
        prop_assert!(!cache.has(&expected_victim), "Key '{}' should be evicted", expected_victim);
        prop_assert!(cache.has(&new_key));
    }
}
