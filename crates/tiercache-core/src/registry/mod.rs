//! Process-wide catalog of cache tiers.
//!
//! The registry is built once at startup through [`RegistryBuilder`] and
//! is immutable afterwards: tiers are never added or removed at runtime.
//! Bulk operations visit tiers one at a time, each tier taking and
//! releasing its own lock, so no lock ever spans two tiers and there is no
//! atomicity across tiers.

mod maintenance;
mod report;

pub use maintenance::{MaintenanceConfig, MaintenanceHandle};
pub use report::{
    ClearReport, DiagnosticsReport, KeyDiagnostics, OutcomeStatus, StatsReport, StatsTotals,
    TierHealth, TierOutcome, TierStatsEntry,
};

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::{CacheError, Result};
use crate::tier::{CacheTier, KeyPattern, validate_key};
use crate::warm::{WarmResult, WarmStrategy, run_warm};

/// Field name reported in validation errors for key-scoped operations.
const KEY_FIELD: &str = "user_id";

struct TierSlot {
    tier: Arc<dyn CacheTier>,
    key_scoped: bool,
    warmer: Option<Arc<dyn WarmStrategy>>,
    warming: Arc<AtomicBool>,
}

/// Builder for [`CacheRegistry`]; the only place tiers can be added.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tiercache_core::registry::RegistryBuilder;
/// use tiercache_core::tier::MemoryTier;
///
/// # fn main() -> tiercache_core::Result<()> {
/// let mut builder = RegistryBuilder::new();
/// builder
///     .register(Arc::new(MemoryTier::new("user-environment", None)))?
///     .register(Arc::new(MemoryTier::new("secrets", None)))?
///     .key_scoped("user-environment")?;
///
/// let registry = builder.build();
/// assert_eq!(registry.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    tiers: IndexMap<String, TierSlot>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tier under its own name.
    ///
    /// # Errors
    ///
    /// `CacheError::DuplicateTier` if the name is already registered.
    pub fn register(&mut self, tier: Arc<dyn CacheTier>) -> Result<&mut Self> {
        let name = tier.name().to_string();
        if self.tiers.contains_key(&name) {
            return Err(CacheError::duplicate_tier(name));
        }

        self.tiers.insert(
            name,
            TierSlot {
                tier,
                key_scoped: false,
                warmer: None,
                warming: Arc::new(AtomicBool::new(false)),
            },
        );
        Ok(self)
    }

    /// Marks a tier as keyed by user identifier, so key-scoped clears visit it.
    pub fn key_scoped(&mut self, name: &str) -> Result<&mut Self> {
        self.slot_mut(name)?.key_scoped = true;
        Ok(self)
    }

    /// Attaches a warm strategy to a tier.
    pub fn warm_with(&mut self, name: &str, strategy: Arc<dyn WarmStrategy>) -> Result<&mut Self> {
        self.slot_mut(name)?.warmer = Some(strategy);
        Ok(self)
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut TierSlot> {
        self.tiers
            .get_mut(name)
            .ok_or_else(|| CacheError::unknown_tier(name))
    }

    /// Freezes the set of tiers.
    pub fn build(self) -> CacheRegistry {
        info!(
            tiers = ?self.tiers.keys().collect::<Vec<_>>(),
            "Cache registry initialized"
        );
        CacheRegistry { tiers: self.tiers }
    }
}

/// Immutable catalog of tiers with uniform bulk operations.
pub struct CacheRegistry {
    tiers: IndexMap<String, TierSlot>,
}

impl CacheRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tier names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tiers.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tiers.contains_key(name)
    }

    fn slot(&self, name: &str) -> Result<&TierSlot> {
        self.tiers
            .get(name)
            .ok_or_else(|| CacheError::unknown_tier(name))
    }

    /// Returns a tier by name.
    pub fn tier(&self, name: &str) -> Result<Arc<dyn CacheTier>> {
        self.slot(name).map(|slot| Arc::clone(&slot.tier))
    }

    pub fn is_key_scoped(&self, name: &str) -> Result<bool> {
        self.slot(name).map(|slot| slot.key_scoped)
    }

    async fn clear_slot(slot: &TierSlot) -> TierOutcome {
        let name = slot.tier.name();
        match slot.tier.clear().await {
            Ok(removed) => TierOutcome::ok(name, removed),
            Err(e) => {
                warn!(tier = %name, error = %e, "Tier clear failed");
                TierOutcome::failed(name, e.to_string())
            },
        }
    }

    /// Clears every tier. Failures are collected, never short-circuited.
    pub async fn clear_all(&self) -> ClearReport {
        let mut outcomes = Vec::with_capacity(self.tiers.len());
        for slot in self.tiers.values() {
            outcomes.push(Self::clear_slot(slot).await);
        }

        let report = ClearReport::new("clear_all", None, outcomes);
        info!(
            removed = report.total_removed(),
            failed = ?report.failed_tiers(),
            "All tiers cleared"
        );
        report
    }

    /// Clears one tier.
    ///
    /// # Errors
    ///
    /// `CacheError::UnknownTier` before anything is touched.
    pub async fn clear_tier(&self, name: &str) -> Result<ClearReport> {
        let slot = self.slot(name)?;
        let outcome = Self::clear_slot(slot).await;
        Ok(ClearReport::new("clear_tier", None, vec![outcome]))
    }

    /// Invalidates one identifier's entries across the key-scoped tiers.
    ///
    /// Both the plain key and composite keys `<id>:<suffix>` are removed.
    /// Tiers that are not key-scoped are reported as skipped.
    ///
    /// # Errors
    ///
    /// `CacheError::Validation` for a malformed identifier, before any tier
    /// is touched.
    pub async fn clear_for_key(&self, raw_key: &str) -> Result<ClearReport> {
        let key = validate_key(KEY_FIELD, raw_key)?;
        let pattern = KeyPattern::scoped(&key)?;

        let mut outcomes = Vec::with_capacity(self.tiers.len());
        for slot in self.tiers.values() {
            let name = slot.tier.name();
            if !slot.key_scoped {
                outcomes.push(TierOutcome::skipped(name));
                continue;
            }

            let result = async {
                let exact = u64::from(slot.tier.invalidate(&key).await?);
                let composite = slot.tier.invalidate_matching(&pattern).await? as u64;
                Ok::<_, CacheError>(exact + composite)
            }
            .await;

            outcomes.push(match result {
                Ok(removed) => TierOutcome::ok(name, removed),
                Err(e) => {
                    warn!(tier = %name, key = %key, error = %e, "Key-scoped clear failed");
                    TierOutcome::failed(name, e.to_string())
                },
            });
        }

        let report = ClearReport::new("clear_for_key", Some(key), outcomes);
        info!(
            key = ?report.key,
            removed = report.total_removed(),
            failed = ?report.failed_tiers(),
            "Key-scoped clear finished"
        );
        Ok(report)
    }

    async fn stats_slot(slot: &TierSlot) -> TierStatsEntry {
        let name = slot.tier.name().to_string();
        let warmable = slot.warmer.is_some();

        match slot.tier.stats().await {
            Ok(stats) => TierStatsEntry {
                tier: name,
                health: TierHealth::Ok,
                key_scoped: slot.key_scoped,
                warmable,
                stats: Some(stats),
                error: None,
            },
            Err(e) => {
                warn!(tier = %name, error = %e, "Tier stats unavailable");
                TierStatsEntry {
                    tier: name,
                    health: TierHealth::Degraded,
                    key_scoped: slot.key_scoped,
                    warmable,
                    stats: None,
                    error: Some(e.to_string()),
                }
            },
        }
    }

    /// Aggregates stats from every tier. Never fails: a tier whose stats
    /// cannot be read is reported as degraded.
    pub async fn stats_all(&self) -> StatsReport {
        let mut entries = Vec::with_capacity(self.tiers.len());
        for slot in self.tiers.values() {
            entries.push(Self::stats_slot(slot).await);
        }
        StatsReport::new(entries)
    }

    /// Per-identifier diagnostics over the key-scoped tiers, plus aggregate stats.
    ///
    /// Lookups use `peek`, so hit/miss counters are not affected.
    pub async fn diagnostics(&self, user_id: Option<&str>) -> Result<DiagnosticsReport> {
        let user_id = user_id.map(|raw| validate_key(KEY_FIELD, raw)).transpose()?;

        let mut key_scoped = Vec::new();
        if let Some(id) = &user_id {
            let pattern = KeyPattern::scoped(id)?;
            for slot in self.tiers.values().filter(|slot| slot.key_scoped) {
                let tier = slot.tier.as_ref();
                let entry = tier.peek(id).await.map(|e| e.info(id.as_str()));

                key_scoped.push(match tier.keys().await {
                    Ok(keys) => KeyDiagnostics {
                        tier: tier.name().to_string(),
                        entry,
                        matching_keys: keys.iter().filter(|k| pattern.matches(k)).count() as u64,
                        error: None,
                    },
                    Err(e) => KeyDiagnostics {
                        tier: tier.name().to_string(),
                        entry,
                        matching_keys: 0,
                        error: Some(e.to_string()),
                    },
                });
            }
        }

        Ok(DiagnosticsReport {
            user_id,
            key_scoped,
            aggregate: self.stats_all().await,
        })
    }

    /// Warms one tier, waiting at most `timeout`.
    ///
    /// Tiers without a strategy report `NotSupported` and are left unchanged.
    ///
    /// # Errors
    ///
    /// `CacheError::UnknownTier` if the tier does not exist.
    pub async fn warm(&self, name: &str, timeout: Duration) -> Result<WarmResult> {
        let slot = self.slot(name)?;

        let Some(strategy) = slot.warmer.clone() else {
            info!(tier = %name, "Warm requested for tier without strategy");
            return Ok(WarmResult::not_supported(name));
        };

        Ok(run_warm(
            Arc::clone(&slot.tier),
            strategy,
            Arc::clone(&slot.warming),
            timeout,
        )
        .await)
    }

    /// Drops expired entries from every tier. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut purged = 0;
        for slot in self.tiers.values() {
            purged += slot.tier.purge_expired().await;
        }
        purged
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("tiers", &self.tiers.keys().collect::<Vec<_>>())
            .finish()
    }
}
