//! Warm strategies: proactive pre-population of a tier.
//!
//! A strategy loads a tier through normal [`CacheTier::set`] calls, so
//! readers never observe a torn tier while warming runs. Progress is
//! tracked in a shared [`WarmProgress`] so a run cut short by its timeout
//! still reports how many items it loaded.

mod runner;

pub use runner::run_warm;

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::entry::CacheValue;
use crate::error::Result;
use crate::tier::CacheTier;

/// Outcome of a warm run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmStatus {
    /// Every item was loaded.
    Completed,
    /// The run finished but some items failed to load.
    Partial,
    /// The strategy failed (backing source unreachable, etc.).
    Failed,
    /// The run exceeded its budget; loaded items are kept.
    TimedOut,
    /// The tier has no warm strategy.
    NotSupported,
    /// Another warm of the same tier is still in flight.
    AlreadyRunning,
}

impl WarmStatus {
    /// Returns true if the outcome should be reported as a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Partial | Self::Failed | Self::TimedOut)
    }
}

/// Result of warming one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmResult {
    pub tier: String,
    pub status: WarmStatus,
    pub items_loaded: u64,
    pub duration_ms: u64,
    pub errors: Vec<String>,
}

impl WarmResult {
    /// Result for a tier without a registered strategy.
    pub fn not_supported(tier: impl Into<String>) -> Self {
        let tier = tier.into();
        Self {
            errors: vec![crate::CacheError::warm_unsupported(&tier).to_string()],
            tier,
            status: WarmStatus::NotSupported,
            items_loaded: 0,
            duration_ms: 0,
        }
    }

    /// Returns true unless the status is a failure.
    pub fn is_success(&self) -> bool {
        !self.status.is_failure()
    }
}

/// Shared progress of a warm run.
#[derive(Debug, Default)]
pub struct WarmProgress {
    loaded: AtomicU64,
    errors: Mutex<Vec<String>>,
}

impl WarmProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one item into the tier and counts it.
    ///
    /// A failed write is recorded as an item error, not propagated.
    pub async fn load(&self, tier: &dyn CacheTier, key: &str, value: CacheValue) {
        match tier.set(key, value).await {
            Ok(_) => {
                self.loaded.fetch_add(1, Ordering::Relaxed);
            },
            Err(e) => self.record_error(e.to_string()),
        }
    }

    /// Records a per-item failure.
    pub fn record_error(&self, error: impl Into<String>) {
        self.errors.lock().push(error.into());
    }

    pub fn items_loaded(&self) -> u64 {
        self.loaded.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

/// Per-tier logic that pre-populates a tier from its backing source.
///
/// # Example
///
/// ```ignore
/// struct Seed;
///
/// #[async_trait]
/// impl WarmStrategy for Seed {
///     fn source(&self) -> &str {
///         "seed"
///     }
///
///     async fn warm(&self, tier: &dyn CacheTier, progress: &WarmProgress) -> Result<()> {
///         progress.load(tier, "42", json!({"region": "eu"})).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait WarmStrategy: Send + Sync {
    /// Name of the backing source, used in logs.
    fn source(&self) -> &str;

    /// Loads items into `tier`, recording progress as it goes.
    ///
    /// Returning an error marks the whole run as failed; items already
    /// loaded stay in the tier.
    async fn warm(&self, tier: &dyn CacheTier, progress: &WarmProgress) -> Result<()>;
}
