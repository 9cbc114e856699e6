//! Response Cache
//!
//! Concurrent memo map from a canonical request key to a serialized
//! response body, with per-entry expiry.

use bytes::Bytes;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cached body and its expiry
#[derive(Debug, Clone)]
struct Entry {
    body: Bytes,
    expires_at: Instant,
}

impl Entry {
    fn new(body: Bytes, ttl: Duration) -> Self {
        Self {
            body,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Default upper bound on cached responses
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Time-bounded, size-bounded response cache, cheap to clone
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<DashMap<String, Entry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Cap the number of live entries
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Canonical cache key: route plus the JSON encoding of its arguments
    pub fn key<T: Serialize>(route: &str, args: &T) -> Option<String> {
        serde_json::to_string(args)
            .ok()
            .map(|json| format!("{} {}", route, json))
    }

    /// Cached body, unless missing or expired
    #[inline]
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.inner.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.body.clone())
            }
        })
    }

    /// Store a body. A new key is refused while the cache is full of live
    /// entries; returns whether the body was stored.
    pub fn set(&self, key: String, body: Bytes) -> bool {
        if !self.inner.contains_key(&key) && self.is_full() {
            self.cleanup_expired();
            if self.is_full() {
                return false;
            }
        }
        self.inner.insert(key, Entry::new(body, self.ttl));
        true
    }

    pub fn is_full(&self) -> bool {
        self.inner.len() >= self.max_entries
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of entries, expired ones included until cleaned
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Remove expired entries, returns count removed
    pub fn cleanup_expired(&self) -> usize {
        let mut removed = 0;
        self.inner.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn test_get_set() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let key = ResponseCache::key("/search", &json!({"location": "A", "radius": 5.0})).unwrap();

        assert!(cache.get(&key).is_none());
        cache.set(key.clone(), Bytes::from_static(b"[]"));
        assert_eq!(cache.get(&key), Some(Bytes::from_static(b"[]")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_distinguishes_routes_and_args() {
        let a = ResponseCache::key("/search", &json!({"location": "A"})).unwrap();
        let b = ResponseCache::key("/recommend", &json!({"location": "A"})).unwrap();
        let c = ResponseCache::key("/search", &json!({"location": "B"})).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_expiry_and_cleanup() {
        let cache = ResponseCache::new(Duration::from_millis(50));
        for i in 0..5 {
            cache.set(format!("k{}", i), Bytes::from(format!("v{}", i)));
        }

        thread::sleep(Duration::from_millis(100));
        assert!(cache.get("k0").is_none());

        let removed = cache.cleanup_expired();
        assert_eq!(removed, 5);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_distinct_keys_bounded() {
        let cache = ResponseCache::new(Duration::from_secs(60)).with_max_entries(3);
        for i in 0..100 {
            let key = ResponseCache::key("/search", &json!({"location": "A", "radius": 1.0 + i as f64 * 0.001}))
                .unwrap();
            cache.set(key, Bytes::from_static(b"[]"));
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.is_full());
        assert!(!cache.set("fresh".to_string(), Bytes::from_static(b"[]")));
    }

    #[test]
    fn test_full_cache_reclaims_expired() {
        let cache = ResponseCache::new(Duration::from_millis(20)).with_max_entries(2);
        assert!(cache.set("a".to_string(), Bytes::from_static(b"1")));
        assert!(cache.set("b".to_string(), Bytes::from_static(b"2")));

        thread::sleep(Duration::from_millis(40));
        assert!(cache.set("c".to_string(), Bytes::from_static(b"3")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_existing_key_overwritten_when_full() {
        let cache = ResponseCache::new(Duration::from_secs(60)).with_max_entries(1);
        assert!(cache.set("a".to_string(), Bytes::from_static(b"1")));
        assert!(cache.set("a".to_string(), Bytes::from_static(b"2")));
        assert_eq!(cache.get("a"), Some(Bytes::from_static(b"2")));
    }
}
