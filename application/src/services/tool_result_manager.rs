//! Content-addressed cache of tool outputs.
//!
//! Entries live in a sharded [`DashMap`], so concurrent calls writing distinct
//! keys never contend on a global lock. Hit/miss counters are atomics, and an
//! insertion-order queue (pruned lazily) answers `oldest_entry` without a scan.

use crate::config::CacheParams;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use relay_domain::CacheKey;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CachedToolResult {
    pub result: String,
    pub stored_at: DateTime<Utc>,
    pub ttl: Option<Duration>,
    inserted: Instant,
    seq: u64,
}

impl CachedToolResult {
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.inserted) >= ttl)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Stored entries, including expired ones not yet purged
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, 0 when there were no lookups
    pub hit_rate: f64,
    pub oldest_entry: Option<DateTime<Utc>>,
}

pub struct ToolResultManager {
    entries: DashMap<CacheKey, CachedToolResult>,
    order: Mutex<VecDeque<(u64, CacheKey)>>,
    next_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    default_ttl: Option<Duration>,
}

impl Default for ToolResultManager {
    fn default() -> Self {
        Self::new(CacheParams::default())
    }
}

impl ToolResultManager {
    pub fn new(params: CacheParams) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            next_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            default_ttl: params.default_ttl,
        }
    }

    /// Store a result, overwriting any prior entry for the same key.
    pub fn cache_result(&self, tool_name: &str, input: &serde_json::Value, result: impl Into<String>) {
        self.cache_result_with_ttl(tool_name, input, result, self.default_ttl);
    }

    pub fn cache_result_with_ttl(
        &self,
        tool_name: &str,
        input: &serde_json::Value,
        result: impl Into<String>,
        ttl: Option<Duration>,
    ) {
        let key = CacheKey::compute(tool_name, input);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key.clone(),
            CachedToolResult {
                result: result.into(),
                stored_at: Utc::now(),
                ttl,
                inserted: Instant::now(),
                seq,
            },
        );

        let mut order = self.order.lock();
        order.push_back((seq, key));
        // Overwrites leave stale queue slots behind; compact when they dominate
        if order.len() > 2 * self.entries.len() + 16 {
            order.retain(|(seq, key)| self.is_current(key, *seq));
        }
        debug!(tool = tool_name, "Cached tool result");
    }

    /// Look up a cached result. Misses (including expired entries) return `None`.
    ///
    /// Only the hit/miss counters change; entries are never mutated here.
    pub fn get_cached_result(&self, tool_name: &str, input: &serde_json::Value) -> Option<String> {
        let key = CacheKey::compute(tool_name, input);
        let now = Instant::now();
        let found = self
            .entries
            .get(&key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.result.clone());

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            size: self.entries.len(),
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            oldest_entry: self.oldest_entry(),
        }
    }

    /// Remove all entries and reset counters.
    pub fn clear_cache(&self) {
        let mut order = self.order.lock();
        order.clear();
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn oldest_entry(&self) -> Option<DateTime<Utc>> {
        let mut order = self.order.lock();
        while let Some((seq, key)) = order.front() {
            if let Some(entry) = self.entries.get(key)
                && entry.seq == *seq
            {
                return Some(entry.stored_at);
            }
            order.pop_front();
        }
        None
    }

    fn is_current(&self, key: &CacheKey, seq: u64) -> bool {
        self.entries.get(key).is_some_and(|e| e.seq == seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_miss_then_hit() {
        let cache = ToolResultManager::default();
        let input = json!({"path": "src/main.rs"});

        assert_eq!(cache.get_cached_result("read_file", &input), None);
        cache.cache_result("read_file", &input, "fn main() {}");
        assert_eq!(
            cache.get_cached_result("read_file", &input).as_deref(),
            Some("fn main() {}")
        );

        let stats = cache.get_cache_stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ToolResultManager::default();
        let input = json!({"q": "x"});
        cache.cache_result("search", &input, "first");
        cache.cache_result("search", &input, "second");
        assert_eq!(cache.get_cached_result("search", &input).as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reordered_input_hits() {
        let cache = ToolResultManager::default();
        cache.cache_result("grep", &json!({"pattern": "TODO", "path": "."}), "3 matches");
        assert_eq!(
            cache
                .get_cached_result("grep", &json!({"path": ".", "pattern": "TODO"}))
                .as_deref(),
            Some("3 matches")
        );
    }

    #[test]
    fn test_clear_resets_everything() {
        let cache = ToolResultManager::default();
        let input = json!({});
        cache.cache_result("t", &input, "v");
        cache.get_cached_result("t", &input);
        cache.clear_cache();

        assert_eq!(cache.get_cached_result("t", &input), None);
        let stats = cache.get_cache_stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert!(stats.oldest_entry.is_none());
    }

    #[test]
    fn test_oldest_entry_skips_overwritten() {
        let cache = ToolResultManager::default();
        cache.cache_result("a", &json!(1), "a1");
        cache.cache_result("b", &json!(2), "b1");
        let first_b = cache.entries.get(&CacheKey::compute("b", &json!(2))).unwrap().stored_at;

        // Overwriting "a" moves it behind "b"
        cache.cache_result("a", &json!(1), "a2");
        assert_eq!(cache.get_cache_stats().oldest_entry, Some(first_b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry_reads_as_miss() {
        let cache = ToolResultManager::default();
        let input = json!({"url": "https://example.com"});
        cache.cache_result_with_ttl("fetch", &input, "<html>", Some(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(cache.get_cached_result("fetch", &input).is_some());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.get_cached_result("fetch", &input).is_none());
        // Lookup did not remove it
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_distinct_keys() {
        let cache = Arc::new(ToolResultManager::default());
        let mut handles = Vec::new();
        for i in 0..32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let input = json!({"i": i});
                cache.cache_result("tool", &input, format!("out-{i}"));
                cache.get_cached_result("tool", &input)
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(format!("out-{i}")));
        }
        assert_eq!(cache.len(), 32);
    }
}
