use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Last good value per client, forgotten after a fixed time to live.
///
/// Every insert and lookup first sweeps expired entries; the sweep walks the
/// whole map once under the lock.
#[derive(Debug)]
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (V, Instant)>>,
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert_at(&self, key: impl Into<String>, value: V, now: Instant) {
        let mut entries = self.entries.lock();
        sweep(&mut entries, now);
        entries.insert(key.into(), (value, now + self.ttl));
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock();
        sweep(&mut entries, now);
        entries.get(key).map(|(value, _)| value.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sweep<V>(entries: &mut HashMap<String, (V, Instant)>, now: Instant) {
    let before = entries.len();
    entries.retain(|_, (_, expires_at)| now < *expires_at);
    let evicted = before - entries.len();
    if evicted > 0 {
        debug!(evicted, "swept expired cache entries");
    }
}
