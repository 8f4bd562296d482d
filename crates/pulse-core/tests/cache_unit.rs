// crates/pulse-core/tests/cache_unit.rs
// ============================================================================
// Module: Response Cache Tests
// Description: Validate TTL expiry and pattern invalidation.
// Purpose: Pin cache behavior under a deterministic clock.
// Dependencies: pulse-core, time
// ============================================================================

//! Unit tests for the in-memory response cache.

use std::sync::Arc;
use std::time::Duration;

use pulse_core::FixedClock;
use pulse_core::InMemoryResponseCache;
use pulse_core::KeyPattern;
use pulse_core::ResponseCache;
use time::OffsetDateTime;

fn cache_at_epoch(ttl: Duration) -> (Arc<FixedClock>, InMemoryResponseCache) {
    let clock = Arc::new(FixedClock::new(OffsetDateTime::UNIX_EPOCH));
    let cache = InMemoryResponseCache::with_ttl(clock.clone(), ttl);
    (clock, cache)
}

#[test]
fn hit_within_ttl_miss_after_expiry() {
    let (clock, cache) = cache_at_epoch(Duration::from_secs(300));
    cache.put("okr:summary:YTD:all", "payload".to_string());
    clock.advance(Duration::from_secs(299));
    assert_eq!(cache.get("okr:summary:YTD:all"), Some("payload".to_string()));
    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.get("okr:summary:YTD:all"), None);
    // The expired entry was purged by the read.
    assert!(cache.is_empty());
}

#[test]
fn put_refreshes_expiry() {
    let (clock, cache) = cache_at_epoch(Duration::from_secs(60));
    cache.put("k", "v1".to_string());
    clock.advance(Duration::from_secs(45));
    cache.put("k", "v2".to_string());
    clock.advance(Duration::from_secs(45));
    assert_eq!(cache.get("k"), Some("v2".to_string()));
}

#[test]
fn exact_pattern_removes_one_key() {
    let (_clock, cache) = cache_at_epoch(Duration::from_secs(300));
    cache.put("okr:summary:YTD:all", "a".to_string());
    cache.put("okr:summary:Q1:all", "b".to_string());
    let removed = cache.invalidate(&KeyPattern::parse("okr:summary:YTD:all"));
    assert_eq!(removed, 1);
    assert_eq!(cache.get("okr:summary:YTD:all"), None);
    assert_eq!(cache.get("okr:summary:Q1:all"), Some("b".to_string()));
}

#[test]
fn prefix_pattern_removes_all_variants() {
    let (_clock, cache) = cache_at_epoch(Duration::from_secs(300));
    cache.put("okr:summary:YTD:all", "a".to_string());
    cache.put("okr:summary:Q1:core", "b".to_string());
    cache.put("okr:quarter:2026", "c".to_string());
    let removed = cache.invalidate(&KeyPattern::parse("okr:summary:*"));
    assert_eq!(removed, 2);
    assert_eq!(cache.get("okr:quarter:2026"), Some("c".to_string()));
}

#[test]
fn pattern_parse_distinguishes_forms() {
    assert_eq!(KeyPattern::parse("a:b"), KeyPattern::Exact("a:b".to_string()));
    assert_eq!(KeyPattern::parse("a:*"), KeyPattern::Prefix("a:".to_string()));
    assert!(KeyPattern::parse("*").matches("anything"));
}

#[test]
fn clear_removes_everything_and_reports_count() {
    let (_clock, cache) = cache_at_epoch(Duration::from_secs(300));
    cache.put("a", "1".to_string());
    cache.put("b", "2".to_string());
    assert_eq!(cache.clear(), 2);
    assert!(cache.is_empty());
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.clear(), 0);
}
