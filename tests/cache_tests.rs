use gantt_tool::ResponseCache;
use gantt_tool::cache::DEFAULT_TTL;
use std::time::{Duration, Instant};

const MINUTE: Duration = Duration::from_secs(60);

#[test]
fn default_ttl_is_five_minutes() {
    let cache: ResponseCache<String> = ResponseCache::default();
    assert_eq!(cache.ttl(), DEFAULT_TTL);
    assert_eq!(DEFAULT_TTL, 5 * MINUTE);
}

#[test]
fn entries_expire_after_the_ttl() {
    let cache = ResponseCache::default();
    let now = Instant::now();
    cache.insert_at("client", "chart".to_string(), now);

    assert_eq!(cache.get_at("client", now + 3 * MINUTE), Some("chart".to_string()));
    assert_eq!(cache.get_at("client", now + 60 * MINUTE), None);
    assert!(cache.is_empty());
}

#[test]
fn longer_ttl_keeps_entries() {
    let cache = ResponseCache::new(120 * MINUTE);
    let now = Instant::now();
    cache.insert_at("client", 7, now);
    assert_eq!(cache.get_at("client", now + 60 * MINUTE), Some(7));
}

#[test]
fn inserting_sweeps_expired_entries() {
    let cache = ResponseCache::new(MINUTE);
    let now = Instant::now();
    cache.insert_at("a", 1, now);
    cache.insert_at("b", 2, now + 30 * Duration::from_secs(1));
    assert_eq!(cache.len(), 2);

    cache.insert_at("c", 3, now + 2 * MINUTE);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get_at("c", now + 2 * MINUTE), Some(3));
}

#[test]
fn reinserting_replaces_the_value() {
    let cache = ResponseCache::new(MINUTE);
    cache.insert("client", "old");
    cache.insert("client", "new");
    assert_eq!(cache.get("client"), Some("new"));
    assert_eq!(cache.get("other"), None);
}
