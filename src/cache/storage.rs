//! In-memory response cache with per-outcome TTLs
//!
//! Expiry is lazy: entries are checked on lookup and swept only when a write
//! pushes the map over its cap. Overflow beyond the sweep is evicted oldest
//! insertion first.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use log::debug;

use super::CacheTtl;
use crate::client::{FetchResult, RawPayload};

/// Default entry cap
pub const DEFAULT_MAX_ENTRIES: usize = 25;

/// Cache sizing and TTL settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub success_ttl: Duration,
    pub failure_ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            success_ttl: CacheTtl::SUCCESS,
            failure_ttl: CacheTtl::FAILURE,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: FetchResult<RawPayload>,
    expires_at: Instant,
}

/// Upstream results keyed by [`cache_key`](super::cache_key).
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    config: CacheConfig,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            config,
        }
    }

    /// Get a cached result if it has not expired
    pub fn get(&mut self, key: &str) -> Option<FetchResult<RawPayload>> {
        self.get_at(key, Instant::now())
    }

    /// Store a result; successes and failures get different TTLs.
    ///
    /// Overwriting a key renews its TTL but keeps its eviction position.
    pub fn set(&mut self, key: &str, result: FetchResult<RawPayload>) {
        self.set_at(key, result, Instant::now());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<FetchResult<RawPayload>> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now >= entry.expires_at,
        };

        if expired {
            debug!("Cache entry expired: {}", key);
            self.entries.remove(key);
            self.order.retain(|k| k != key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.result.clone())
    }

    pub(crate) fn set_at(&mut self, key: &str, result: FetchResult<RawPayload>, now: Instant) {
        let ttl = if result.is_ok() {
            self.config.success_ttl
        } else {
            self.config.failure_ttl
        };

        let entry = CacheEntry {
            result,
            expires_at: now + ttl,
        };
        if self.entries.insert(key.to_string(), entry).is_none() {
            self.order.push_back(key.to_string());
        }

        if self.entries.len() > self.config.max_entries {
            self.evict(now);
        }
    }

    /// Sweep expired entries, then drop oldest insertions until under the cap.
    fn evict(&mut self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));

        while self.entries.len() > self.config.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }

        debug!(
            "Cache eviction removed {} entries ({} remain)",
            before - self.entries.len(),
            self.entries.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok_result() -> FetchResult<RawPayload> {
        FetchResult::ok(json!({ "lighthouseResult": {} }), 200)
    }

    fn err_result() -> FetchResult<RawPayload> {
        FetchResult::err("HTTP 500", Some(500), None)
    }

    fn small_cache(max_entries: usize) -> ResponseCache {
        ResponseCache::new(CacheConfig {
            max_entries,
            ..CacheConfig::default()
        })
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut cache = ResponseCache::default();
        let result = ok_result();

        cache.set("mobile||https://a.test/", result.clone());

        assert_eq!(cache.get("mobile||https://a.test/"), Some(result));
        assert_eq!(cache.get("desktop||https://a.test/"), None);
    }

    #[test]
    fn test_success_expires_after_success_ttl() {
        let mut cache = ResponseCache::default();
        let start = Instant::now();
        cache.set_at("k", ok_result(), start);

        let just_before = start + CacheTtl::SUCCESS - Duration::from_millis(1);
        assert!(cache.get_at("k", just_before).is_some());

        let after = start + CacheTtl::SUCCESS;
        assert!(cache.get_at("k", after).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failure_uses_shorter_ttl() {
        let mut cache = ResponseCache::default();
        let start = Instant::now();
        cache.set_at("ok", ok_result(), start);
        cache.set_at("err", err_result(), start);

        let later = start + CacheTtl::FAILURE + Duration::from_secs(1);
        assert!(cache.get_at("err", later).is_none());
        assert!(cache.get_at("ok", later).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_replaces_result() {
        let mut cache = ResponseCache::default();
        cache.set("k", err_result());
        cache.set("k", ok_result());

        assert!(cache.get("k").unwrap().is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_never_exceeds_cap() {
        let mut cache = small_cache(5);
        for i in 0..40 {
            cache.set(&format!("key-{}", i), ok_result());
            assert!(cache.len() <= 5);
        }
    }

    #[test]
    fn test_evicts_oldest_insertion_first() {
        let mut cache = small_cache(3);
        let now = Instant::now();
        for key in ["a", "b", "c", "d"] {
            cache.set_at(key, ok_result(), now);
        }

        assert!(cache.get_at("a", now).is_none());
        for key in ["b", "c", "d"] {
            assert!(cache.get_at(key, now).is_some(), "{} should survive", key);
        }
    }

    #[test]
    fn test_expired_entries_swept_before_live_ones() {
        let mut cache = small_cache(2);
        let start = Instant::now();
        cache.set_at("live", ok_result(), start);
        cache.set_at("stale", err_result(), start);

        let later = start + CacheTtl::FAILURE + Duration::from_secs(1);
        cache.set_at("new", ok_result(), later);

        assert_eq!(cache.len(), 2);
        assert!(cache.get_at("live", later).is_some());
        assert!(cache.get_at("new", later).is_some());
    }

    #[test]
    fn test_overwrite_keeps_eviction_position() {
        let mut cache = small_cache(2);
        let now = Instant::now();
        cache.set_at("a", ok_result(), now);
        cache.set_at("b", ok_result(), now);
        cache.set_at("a", ok_result(), now);
        assert_eq!(cache.len(), 2);

        cache.set_at("c", ok_result(), now);

        assert!(cache.get_at("a", now).is_none());
        assert!(cache.get_at("b", now).is_some());
        assert!(cache.get_at("c", now).is_some());
    }

    #[test]
    fn test_overwrite_renews_ttl() {
        let mut cache = ResponseCache::default();
        let start = Instant::now();
        cache.set_at("k", ok_result(), start);
        let later = start + Duration::from_secs(60);
        cache.set_at("k", ok_result(), later);

        assert!(cache.get_at("k", start + CacheTtl::SUCCESS).is_some());
        assert!(cache.get_at("k", later + CacheTtl::SUCCESS).is_none());
    }
}
