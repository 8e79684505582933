//! Tier acotado usando Moka.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use moka::notification::RemovalCause;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use super::CacheTier;
use crate::entry::{CacheEntry, CacheValue};
use crate::error::{CacheError, Result};
use crate::stats::{CapacityPolicy, TierCounters};

/// Tier con capacidad maxima y TTL opcional.
/// Thread-safe y async-friendly.
///
/// Las evictions por capacidad o expiracion se cuentan desde el
/// eviction listener de Moka; las invalidaciones explicitas y los
/// reemplazos no cuentan como eviction.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use tiercache_core::tier::{BoundedTier, CacheTier};
///
/// # #[tokio::main]
/// # async fn main() {
/// let tier = BoundedTier::new("user-cases", 10_000, Some(Duration::from_secs(120)));
///
/// if let Some(entry) = tier.get("42:status=open").await {
///     println!("Cache hit! version {}", entry.version());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct BoundedTier {
    name: Arc<str>,
    max_capacity: u64,
    ttl: Option<Duration>,
    inner: Cache<String, CacheEntry>,
    versions: Arc<AtomicU64>,
    counters: Arc<TierCounters>,
}

impl BoundedTier {
    /// Crea un nuevo tier con la capacidad y el TTL dados.
    pub fn new(name: impl Into<String>, max_capacity: u64, ttl: Option<Duration>) -> Self {
        let name: String = name.into();
        let counters = Arc::new(TierCounters::new(name.clone()));

        let mut builder = Cache::builder().max_capacity(max_capacity);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        // Configurar listener para evictions
        let eviction_counters = Arc::clone(&counters);
        builder = builder.eviction_listener(move |_key, _value, cause| match cause {
            RemovalCause::Expired => eviction_counters.record_eviction("ttl"),
            RemovalCause::Size => eviction_counters.record_eviction("capacity"),
            RemovalCause::Explicit | RemovalCause::Replaced => {},
        });

        Self {
            name: Arc::from(name),
            max_capacity,
            ttl,
            inner: builder.build(),
            versions: Arc::new(AtomicU64::new(0)),
            counters,
        }
    }

    /// Procesa tareas pendientes de Moka (evictions, expiraciones).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl CacheTier for BoundedTier {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> CapacityPolicy {
        CapacityPolicy::Bounded {
            max_capacity: self.max_capacity,
            ttl_secs: self.ttl.map(|ttl| ttl.as_secs()),
        }
    }

    fn counters(&self) -> &TierCounters {
        &self.counters
    }

    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let found = self.inner.get(key).await.filter(|entry| !entry.is_expired());

        if found.is_some() {
            self.counters.record_hit();
        } else {
            self.counters.record_miss();
        }

        found
    }

    async fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.inner.get(key).await.filter(|entry| !entry.is_expired())
    }

    /// La version se asigna dentro del compute de Moka, que serializa
    /// las escrituras sobre la misma key.
    async fn set(&self, key: &str, value: CacheValue) -> Result<u64> {
        let versions = Arc::clone(&self.versions);
        let ttl = self.ttl;

        let result = self
            .inner
            .entry(key.to_string())
            .and_compute_with(move |_existing| {
                let version = versions.fetch_add(1, Ordering::SeqCst) + 1;
                let entry = CacheEntry::new(value, version, ttl);
                async move { Op::Put(entry) }
            })
            .await;

        match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => {
                self.counters.record_set();
                Ok(entry.into_value().version())
            },
            other => Err(CacheError::tier_operation(
                self.name.to_string(),
                format!("unexpected compute result for '{key}': {other:?}"),
            )),
        }
    }

    async fn invalidate(&self, key: &str) -> Result<bool> {
        let removed = self.inner.remove(key).await.is_some();
        if removed {
            self.counters.record_invalidation();
        }
        Ok(removed)
    }

    /// Moka deja de servir todas las entries insertadas antes de la llamada
    /// en cuanto retorna, sin estados intermedios visibles para `get`.
    async fn clear(&self) -> Result<u64> {
        self.inner.run_pending_tasks().await;
        let removed = self.inner.entry_count();

        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;

        self.counters.record_clear();
        debug!(tier = %self.name, removed, "Tier cleared");
        Ok(removed)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .inner
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| (*key).clone())
            .collect())
    }

    async fn entry_count(&self) -> Result<u64> {
        self.inner.run_pending_tasks().await;
        Ok(self.inner.entry_count())
    }

    async fn purge_expired(&self) -> usize {
        let before = self.counters.evictions();
        self.inner.run_pending_tasks().await;
        self.counters.evictions().saturating_sub(before) as usize
    }
}

impl std::fmt::Debug for BoundedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedTier")
            .field("name", &self.name)
            .field("max_capacity", &self.max_capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_get() {
        let tier = BoundedTier::new("cases", 100, None);

        tier.set("42:open", json!(["case-1"])).await.unwrap();

        let entry = tier.get("42:open").await;
        assert!(entry.is_some());
        assert_eq!(entry.unwrap().value(), &json!(["case-1"]));
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let tier = BoundedTier::new("cases", 100, None);

        assert!(tier.get("nonexistent").await.is_none());
        assert_eq!(tier.counters().misses(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let tier = BoundedTier::new("cases", 100, None);
        tier.set("42", json!(1)).await.unwrap();

        assert!(tier.invalidate("42").await.unwrap());
        assert!(!tier.invalidate("42").await.unwrap());
        assert!(tier.get("42").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_tier() {
        let tier = BoundedTier::new("cases", 100, None);
        for i in 0..10 {
            tier.set(&format!("user{i}"), json!(i)).await.unwrap();
        }

        assert_eq!(tier.clear().await.unwrap(), 10);

        for i in 0..10 {
            assert!(tier.get(&format!("user{i}")).await.is_none());
        }
        let stats = tier.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test]
    async fn test_versions_increase() {
        let tier = BoundedTier::new("cases", 100, None);

        let v1 = tier.set("42", json!("a")).await.unwrap();
        let v2 = tier.set("42", json!("b")).await.unwrap();

        assert!(v2 > v1);
        assert_eq!(tier.peek("42").await.unwrap().version(), v2);
    }

    #[tokio::test]
    async fn test_ttl_expiry_counts_as_eviction() {
        let tier = BoundedTier::new("global", 100, Some(Duration::from_millis(30)));
        tier.set("all", json!([1, 2, 3])).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(tier.get("all").await.is_none());
        tier.sync().await;
        assert_eq!(tier.counters().evictions(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_assign_distinct_versions() {
        let tier = Arc::new(BoundedTier::new("cases", 100, None));
        let mut handles = vec![];

        for i in 0..50 {
            let tier = Arc::clone(&tier);
            handles.push(tokio::spawn(async move {
                tier.set("hot", json!(i)).await.unwrap()
            }));
        }

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap());
        }
        versions.sort_unstable();
        versions.dedup();
        assert_eq!(versions.len(), 50);

        let final_entry = tier.peek("hot").await.unwrap();
        assert_eq!(final_entry.version(), *versions.last().unwrap());
    }
}
