//! Structured results of registry operations.
//!
//! These types are the wire format of the admin HTTP surface; the CLI
//! deserializes the same types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::EntryInfo;
use crate::stats::CacheStats;

/// Outcome of an operation on one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok,
    Failed,
    /// The tier does not take part in the operation (e.g. not key-scoped).
    Skipped,
}

/// Result of a clear operation on one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierOutcome {
    pub tier: String,
    pub status: OutcomeStatus,
    /// Entries removed by the operation.
    pub removed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TierOutcome {
    pub fn ok(tier: impl Into<String>, removed: u64) -> Self {
        Self {
            tier: tier.into(),
            status: OutcomeStatus::Ok,
            removed,
            error: None,
        }
    }

    pub fn failed(tier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            status: OutcomeStatus::Failed,
            removed: 0,
            error: Some(error.into()),
        }
    }

    pub fn skipped(tier: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            status: OutcomeStatus::Skipped,
            removed: 0,
            error: None,
        }
    }
}

/// Partial-failure result of a clear operation across tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub success: bool,
    pub tiers: Vec<TierOutcome>,
}

impl ClearReport {
    pub fn new(operation: impl Into<String>, key: Option<String>, tiers: Vec<TierOutcome>) -> Self {
        let success = tiers.iter().all(|t| t.status != OutcomeStatus::Failed);
        Self {
            operation: operation.into(),
            key,
            success,
            tiers,
        }
    }

    /// Names of the tiers that failed.
    pub fn failed_tiers(&self) -> Vec<&str> {
        self.tiers
            .iter()
            .filter(|t| t.status == OutcomeStatus::Failed)
            .map(|t| t.tier.as_str())
            .collect()
    }

    /// Total entries removed across tiers.
    pub fn total_removed(&self) -> u64 {
        self.tiers.iter().map(|t| t.removed).sum()
    }
}

/// Health of one tier as seen by `stats_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierHealth {
    Ok,
    Degraded,
}

/// Stats entry for one tier; `stats` is absent when the tier is degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStatsEntry {
    pub tier: String,
    pub health: TierHealth,
    pub key_scoped: bool,
    pub warmable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CacheStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sums over the healthy tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTotals {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Aggregated stats across tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub generated_at: DateTime<Utc>,
    pub totals: StatsTotals,
    pub tiers: Vec<TierStatsEntry>,
}

impl StatsReport {
    pub fn new(tiers: Vec<TierStatsEntry>) -> Self {
        let totals = tiers
            .iter()
            .filter_map(|t| t.stats.as_ref())
            .fold(StatsTotals::default(), |acc, s| StatsTotals {
                entries: acc.entries.saturating_add(s.entries),
                hits: acc.hits.saturating_add(s.hits),
                misses: acc.misses.saturating_add(s.misses),
                evictions: acc.evictions.saturating_add(s.evictions),
            });

        Self {
            generated_at: Utc::now(),
            totals,
            tiers,
        }
    }

    /// Names of the tiers whose stats could not be read.
    pub fn degraded_tiers(&self) -> Vec<&str> {
        self.tiers
            .iter()
            .filter(|t| t.health == TierHealth::Degraded)
            .map(|t| t.tier.as_str())
            .collect()
    }

    pub fn tier(&self, name: &str) -> Option<&TierStatsEntry> {
        self.tiers.iter().find(|t| t.tier == name)
    }
}

/// Entries one identifier owns in one key-scoped tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDiagnostics {
    pub tier: String,
    /// The plain entry for the identifier, if cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntryInfo>,
    /// Number of live keys owned by the identifier, composites included.
    pub matching_keys: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Key-scoped diagnostics plus aggregate stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub key_scoped: Vec<KeyDiagnostics>,
    pub aggregate: StatsReport,
}
