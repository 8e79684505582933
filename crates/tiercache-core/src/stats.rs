//! Contadores y estadisticas por tier.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::warm::WarmStatus;

/// Registra las descripciones de las metricas de cache.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_cache_metrics() {
    metrics::describe_counter!("tiercache_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!(
        "tiercache_cache_misses_total",
        "Total number of cache misses"
    );
    metrics::describe_counter!(
        "tiercache_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!(
        "tiercache_cache_entries",
        "Current number of entries per tier"
    );
    metrics::describe_histogram!(
        "tiercache_warm_duration_seconds",
        "Time spent warming a tier"
    );
}

/// Politica de capacidad de un tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Sin limite de entries, con TTL opcional.
    Unbounded { ttl_secs: Option<u64> },
    /// Limite de entries con eviction.
    Bounded {
        max_capacity: u64,
        ttl_secs: Option<u64>,
    },
}

/// Resultado del ultimo warm de un tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastWarm {
    pub at: DateTime<Utc>,
    pub status: WarmStatus,
    pub items_loaded: u64,
}

/// Snapshot de las estadisticas de un tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub tier: String,
    pub policy: CapacityPolicy,
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub sets: u64,
    pub invalidations: u64,
    pub clears: u64,
    pub hit_rate: f64,
    pub last_cleared_at: Option<DateTime<Utc>>,
    pub last_warm: Option<LastWarm>,
}

/// Contadores de un tier.
///
/// Son monotonicos durante la vida del proceso: `clear()` no los reinicia.
/// Ademas de los atomics internos, cada evento se publica en el recorder
/// de `metrics` con el label `tier`.
#[derive(Debug)]
pub struct TierCounters {
    tier: String,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    sets: AtomicU64,
    invalidations: AtomicU64,
    clears: AtomicU64,
    last_cleared_at: Mutex<Option<DateTime<Utc>>>,
    last_warm: Mutex<Option<LastWarm>>,
}

/// Incremento que satura en `u64::MAX` en lugar de dar la vuelta.
fn saturating_add(counter: &AtomicU64, n: u64) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(n))
    });
}

impl TierCounters {
    pub fn new(tier: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            clears: AtomicU64::new(0),
            last_cleared_at: Mutex::new(None),
            last_warm: Mutex::new(None),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        saturating_add(&self.hits, 1);
        counter!("tiercache_cache_hits_total", "tier" => self.tier.clone()).increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        saturating_add(&self.misses, 1);
        counter!("tiercache_cache_misses_total", "tier" => self.tier.clone()).increment(1);
    }

    /// Registra una eviction (`ttl` o `capacity`)
    pub fn record_eviction(&self, reason: &'static str) {
        saturating_add(&self.evictions, 1);
        counter!(
            "tiercache_cache_evictions_total",
            "tier" => self.tier.clone(),
            "reason" => reason
        )
        .increment(1);
    }

    pub fn record_set(&self) {
        saturating_add(&self.sets, 1);
    }

    pub fn record_invalidation(&self) {
        saturating_add(&self.invalidations, 1);
    }

    /// Registra un clear completo del tier.
    pub fn record_clear(&self) {
        saturating_add(&self.clears, 1);
        *self.last_cleared_at.lock() = Some(Utc::now());
    }

    /// Registra el resultado de un warm.
    pub fn record_warm(&self, status: WarmStatus, items_loaded: u64) {
        *self.last_warm.lock() = Some(LastWarm {
            at: Utc::now(),
            status,
            items_loaded,
        });
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: u64) {
        gauge!("tiercache_cache_entries", "tier" => self.tier.clone()).set(count as f64);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Calcula hit rate
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Construye el snapshot de estadisticas con el numero de entries dado.
    pub fn snapshot(&self, policy: CapacityPolicy, entries: u64) -> CacheStats {
        self.update_entry_count(entries);

        CacheStats {
            tier: self.tier.clone(),
            policy,
            entries,
            hits: self.hits(),
            misses: self.misses(),
            evictions: self.evictions(),
            sets: self.sets.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
            last_cleared_at: *self.last_cleared_at.lock(),
            last_warm: self.last_warm.lock().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let counters = TierCounters::new("test");

        // 3 hits, 1 miss = 75% hit rate
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();

        assert!((counters.hit_rate() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_counters_saturate() {
        let counter = AtomicU64::new(u64::MAX - 1);
        saturating_add(&counter, 5);
        assert_eq!(counter.load(Ordering::Relaxed), u64::MAX);
    }

    #[test]
    fn test_snapshot_keeps_counters_after_clear() {
        let counters = TierCounters::new("test");
        counters.record_hit();
        counters.record_miss();
        counters.record_clear();

        let stats = counters.snapshot(CapacityPolicy::Unbounded { ttl_secs: None }, 0);

        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.clears, 1);
        assert!(stats.last_cleared_at.is_some());
        assert!(stats.last_warm.is_none());
    }

    #[test]
    fn test_policy_serialization() {
        let policy = CapacityPolicy::Bounded {
            max_capacity: 100,
            ttl_secs: Some(60),
        };
        let json = serde_json::to_value(policy).unwrap();

        assert_eq!(json["kind"], "bounded");
        assert_eq!(json["max_capacity"], 100);
    }
}
