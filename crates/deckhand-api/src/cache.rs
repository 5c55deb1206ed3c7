// ── Response cache ──
//
// TTL-bounded, LRU-evicted store of successful read responses, keyed by
// request signature (path + query). Shared between the polling task and
// command-issuing callers; the lock only ever guards map operations,
// never a network round trip. Bodies are cloned out under the lock, so
// eviction can never invalidate a response already handed to a caller.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::Value;

/// A cached response body with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry {
    body: Value,
    inserted_at: Instant,
}

/// Bounded, time-boxed response cache.
///
/// No entry older than its TTL is ever returned; expired entries are
/// dropped on sight. The entry count is bounded, evicting
/// least-recently-used.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least one");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Build the cache key for a request signature.
    pub fn key(path: &str, query: &[(&str, String)]) -> String {
        if query.is_empty() {
            return path.to_owned();
        }
        let mut key = String::from(path);
        key.push('?');
        for (i, (name, value)) in query.iter().enumerate() {
            if i > 0 {
                key.push('&');
            }
            key.push_str(name);
            key.push('=');
            key.push_str(value);
        }
        key
    }

    /// Look up a live entry, cloning the body out under the lock.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.body.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// Store a fresh response with the current timestamp.
    pub fn insert(&self, key: String, body: Value) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.put(
            key,
            CacheEntry {
                body,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry whose key starts with one of the given prefixes.
    ///
    /// Used after commands: anything a command could have changed must be
    /// refetched, whether the command itself succeeded or not.
    pub fn invalidate_prefixes(&self, prefixes: &[String]) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let stale: Vec<String> = entries
            .iter()
            .map(|(key, _)| key.clone())
            .filter(|key| prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())))
            .collect();
        for key in stale {
            entries.pop(&key);
        }
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
