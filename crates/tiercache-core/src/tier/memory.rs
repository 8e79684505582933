//! Unbounded in-memory tier with an optional TTL.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use super::CacheTier;
use crate::entry::{CacheEntry, CacheValue};
use crate::error::Result;
use crate::stats::{CapacityPolicy, TierCounters};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Last version handed out. Survives `clear()`.
    last_version: u64,
}

/// Unbounded tier backed by a `RwLock<HashMap>`.
///
/// Reads take the shared lock; `set`, `invalidate` and `clear` take the
/// exclusive lock for a short, non-blocking critical section. Versions are
/// assigned under the exclusive lock, so the last writer to acquire it
/// always holds the highest version.
#[derive(Debug)]
pub struct MemoryTier {
    name: String,
    ttl: Option<Duration>,
    inner: RwLock<Inner>,
    counters: TierCounters,
}

impl MemoryTier {
    /// Creates a tier. `ttl = None` keeps entries until invalidated.
    pub fn new(name: impl Into<String>, ttl: Option<Duration>) -> Self {
        let name = name.into();
        Self {
            counters: TierCounters::new(name.clone()),
            name,
            ttl,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Removes `key` if the entry stored there is still the expired one we saw.
    fn evict_expired(&self, key: &str, version: u64) {
        let mut inner = self.inner.write();
        let still_expired = inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.version() == version && entry.is_expired());

        if still_expired {
            inner.entries.remove(key);
            self.counters.record_eviction("ttl");
        }
    }
}

#[async_trait]
impl CacheTier for MemoryTier {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> CapacityPolicy {
        CapacityPolicy::Unbounded {
            ttl_secs: self.ttl.map(|ttl| ttl.as_secs()),
        }
    }

    fn counters(&self) -> &TierCounters {
        &self.counters
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let found = self.inner.read().entries.get(key).cloned();

        match found {
            Some(entry) if entry.is_expired() => {
                self.evict_expired(key, entry.version());
                self.counters.record_miss();
                None
            },
            Some(entry) => {
                self.counters.record_hit();
                Some(entry)
            },
            None => {
                self.counters.record_miss();
                None
            },
        }
    }

    async fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.inner
            .read()
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .cloned()
    }

    async fn set(&self, key: &str, value: CacheValue) -> Result<u64> {
        let mut inner = self.inner.write();
        inner.last_version = inner.last_version.saturating_add(1);
        let version = inner.last_version;

        inner
            .entries
            .insert(key.to_string(), CacheEntry::new(value, version, self.ttl));
        drop(inner);

        self.counters.record_set();
        Ok(version)
    }

    async fn invalidate(&self, key: &str) -> Result<bool> {
        let removed = self.inner.write().entries.remove(key).is_some();
        if removed {
            self.counters.record_invalidation();
        }
        Ok(removed)
    }

    async fn clear(&self) -> Result<u64> {
        let removed = {
            let mut inner = self.inner.write();
            let removed = inner.entries.len() as u64;
            inner.entries = HashMap::new();
            removed
        };

        self.counters.record_clear();
        debug!(tier = %self.name, removed, "Tier cleared");
        Ok(removed)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let now = Utc::now();
        Ok(self
            .inner
            .read()
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn entry_count(&self) -> Result<u64> {
        let now = Utc::now();
        Ok(self
            .inner
            .read()
            .entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count() as u64)
    }

    async fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let now = Utc::now();
        let mut inner = self.inner.write();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired_at(now));
        let purged = before - inner.entries.len();
        drop(inner);

        for _ in 0..purged {
            self.counters.record_eviction("ttl");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let tier = MemoryTier::new("env", None);

        tier.set("42", json!({"theme": "dark"})).await.unwrap();

        let entry = tier.get("42").await.expect("entry");
        assert_eq!(entry.value(), &json!({"theme": "dark"}));
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let tier = MemoryTier::new("env", None);
        tier.set("42", json!(1)).await.unwrap();

        assert!(tier.invalidate("42").await.unwrap());
        assert!(!tier.invalidate("42").await.unwrap());
        assert!(tier.get("42").await.is_none());
    }

    #[tokio::test]
    async fn test_hit_and_miss_counting() {
        let tier = MemoryTier::new("env", None);
        tier.set("a", json!("x")).await.unwrap();

        for _ in 0..3 {
            assert!(tier.get("a").await.is_some());
        }
        assert!(tier.get("missing").await.is_none());

        let stats = tier.stats().await.unwrap();
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_peek_does_not_count() {
        let tier = MemoryTier::new("env", None);
        tier.set("a", json!("x")).await.unwrap();

        assert!(tier.peek("a").await.is_some());
        assert!(tier.peek("b").await.is_none());

        let stats = tier.stats().await.unwrap();
        assert_eq!(stats.hits + stats.misses, 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_never_returned() {
        let tier = MemoryTier::new("secrets", Some(Duration::from_millis(40)));
        tier.set("db", json!("s3cr3t")).await.unwrap();
        assert!(tier.get("db").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(tier.peek("db").await.is_none());
        assert!(tier.get("db").await.is_none());
        let stats = tier.stats().await.unwrap();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entries, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let tier = MemoryTier::new("secrets", Some(Duration::from_millis(20)));
        for i in 0..5 {
            tier.set(&format!("k{i}"), json!(i)).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(tier.purge_expired().await, 5);
        assert_eq!(tier.counters().evictions(), 5);
    }

    #[tokio::test]
    async fn test_version_bumps_on_every_write() {
        let tier = MemoryTier::new("env", None);

        let v1 = tier.set("42", json!("a")).await.unwrap();
        let v2 = tier.set("42", json!("b")).await.unwrap();
        tier.clear().await.unwrap();
        let v3 = tier.set("42", json!("c")).await.unwrap();

        assert!(v2 > v1);
        assert!(v3 > v2);
    }

    #[tokio::test]
    async fn test_clear_keeps_counters() {
        let tier = MemoryTier::new("env", None);
        tier.set("a", json!(1)).await.unwrap();
        tier.set("b", json!(2)).await.unwrap();
        tier.get("a").await;

        assert_eq!(tier.clear().await.unwrap(), 2);

        let stats = tier.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.clears, 1);
        assert!(stats.last_cleared_at.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_leave_one_value() {
        let tier = Arc::new(MemoryTier::new("env", None));
        let before = tier.set("k", json!("seed")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..2 {
            let tier = Arc::clone(&tier);
            handles.push(tokio::spawn(async move {
                let observed = tier.peek("k").await.map(|e| e.version()).unwrap_or(0);
                let written = tier.set("k", json!(i)).await.unwrap();
                (observed, written, i)
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let final_entry = tier.peek("k").await.unwrap();
        let (v_a, v_b) = (results[0].1, results[1].1);
        assert_ne!(v_a, v_b);
        assert_eq!(final_entry.version(), v_a.max(v_b));
        for (observed, _, _) in &results {
            assert!(final_entry.version() > *observed);
            assert!(*observed >= before);
        }

        let winner = results.iter().find(|r| r.1 == final_entry.version()).unwrap();
        assert_eq!(final_entry.value(), &json!(winner.2));
    }
}
