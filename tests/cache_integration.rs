//! Cache Integration Tests
//!
//! Exercises the public crate surface end to end: eviction under pressure,
//! TTL expiry with a manual clock, event and statistics reporting, snapshot
//! persistence through JSON, namespaces, and the shared handle with its
//! background sweep.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use stash_cache::{
    Cache, CacheConfig, CacheSnapshot, EventKind, EvictionReason, ManualClock, Namespace,
    SharedCache,
};

fn manual_cache(config: CacheConfig, clock: &ManualClock) -> Cache<String> {
    Cache::with_clock(config, Arc::new(clock.clone())).unwrap()
}

#[test]
fn test_session_store_lifecycle() {
    let clock = ManualClock::new(0);
    let config = CacheConfig::new()
        .max_count(3)
        .default_ttl_ms(10_000)
        .sliding_ttl(true)
        .max_ttl_ms(25_000)
        .enable_stats(true);
    let mut cache = manual_cache(config, &clock);

    cache.set("alice", "session-a".to_string());
    cache.set("bob", "session-b".to_string());
    cache.set("carol", "session-c".to_string());

    // Keep alice fresh; the sliding TTL resets on each hit
    for _ in 0..3 {
        clock.advance(8_000);
        assert_eq!(cache.get("alice"), Some("session-a".to_string()));
    }

    // bob and carol expired 10s after creation; alice hit the 25s ceiling
    clock.advance(8_000);
    assert_eq!(cache.get("bob"), None);
    assert_eq!(cache.get("carol"), None);
    assert_eq!(cache.get("alice"), None);

    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.expirations, 3);
    assert_eq!(stats.evictions, 0);
}

#[test]
fn test_eviction_under_pressure_reports_reason() {
    let clock = ManualClock::new(0);
    let config = CacheConfig::new().max_count(2).enable_stats(true);
    let mut cache = manual_cache(config, &clock);

    let log: Arc<Mutex<Vec<(String, EvictionReason)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    cache.on(EventKind::Evict, move |event| {
        sink.lock().unwrap().push((
            event.key.clone().unwrap(),
            event.reason.unwrap(),
        ));
    });

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    let _ = cache.get("a"); // b becomes the eviction candidate
    cache.set("c", "3".to_string());

    assert!(cache.has("a"));
    assert!(!cache.has("b"));
    assert!(cache.has("c"));
    assert_eq!(cache.stats().evictions, 1);
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[("b".to_string(), EvictionReason::Size)]
    );
}

#[test]
fn test_memory_pressure_eviction() {
    let clock = ManualClock::new(0);
    let config = CacheConfig::new().max_memory_bytes(10).enable_stats(true);
    let mut cache = manual_cache(config, &clock).with_size_of(|v: &String| v.len());

    cache.set("a", "aaaa".to_string());
    cache.set("b", "bbbb".to_string());
    cache.set("c", "cccc".to_string()); // pushes total to 12, evicting "a"

    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));
    assert!(cache.memory_used() <= 10);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_snapshot_survives_json_round_trip() {
    let clock = ManualClock::new(1_000);
    let config = CacheConfig::new().max_count(10).default_ttl_ms(60_000);
    let mut cache = manual_cache(config, &clock);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    cache.set_with_ttl("doomed", "x".to_string(), 100);
    let _ = cache.get("a"); // a becomes most recent

    clock.advance(500); // "doomed" expires before export
    let snapshot = cache.to_snapshot();

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: CacheSnapshot<String> = serde_json::from_str(&json).unwrap();

    let mut restored: Cache<String> =
        Cache::from_snapshot_with_clock(parsed, Arc::new(clock.clone())).unwrap();
    assert_eq!(
        restored.entries(),
        vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]
    );

    // Remaining TTL carries over: entries still expire 60s after creation
    clock.advance(60_000);
    assert_eq!(restored.len(), 0);
}

#[test]
fn test_namespaces_share_limits_but_not_keys() {
    let clock = ManualClock::new(0);
    let mut cache = manual_cache(CacheConfig::new().max_count(4), &clock);

    Namespace::new(&mut cache, "users").set("1", "alice".to_string());
    Namespace::new(&mut cache, "posts").set("1", "hello".to_string());

    assert_eq!(
        Namespace::new(&mut cache, "users").get("1"),
        Some("alice".to_string())
    );
    assert_eq!(Namespace::new(&mut cache, "users").clear(), 1);
    assert!(Namespace::new(&mut cache, "posts").has("1"));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_shared_cache_with_sweep() {
    let clock = ManualClock::new(0);
    let config = CacheConfig::new()
        .max_count(10)
        .enable_stats(true)
        .auto_cleanup(true)
        .cleanup_interval_ms(20);
    let mut cache: SharedCache<String> =
        SharedCache::with_clock(config, Arc::new(clock.clone())).unwrap();

    cache.set_with_ttl("short", "v".to_string(), 50).await;
    cache.set("long", "v".to_string()).await;

    clock.advance(100);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cache.keys().await, vec!["long".to_string()]);
    assert_eq!(cache.stats().await.expirations, 1);

    cache.dispose().await;
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn test_get_or_compute_only_computes_on_miss() {
    let clock = ManualClock::new(0);
    let mut cache = manual_cache(CacheConfig::new().max_count(10), &clock);

    let first = cache.get_or_compute("config", || async { "loaded".to_string() }).await;
    assert_eq!(first, "loaded");

    // A resident key short-circuits the computation
    let second = cache
        .get_or_compute("config", || async { "recomputed".to_string() })
        .await;
    assert_eq!(second, "loaded");
}
