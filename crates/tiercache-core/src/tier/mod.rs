//! Cache tiers.
//!
//! A tier is a named key→value store with its own capacity policy. Every
//! variant implements [`CacheTier`] so the registry can operate on them
//! uniformly:
//!
//! - [`MemoryTier`] - unbounded map with an optional TTL
//! - [`BoundedTier`] - Moka-backed cache with capacity eviction and TTL

mod bounded;
mod keys;
mod memory;

pub use bounded::BoundedTier;
pub use keys::{KeyPattern, MAX_KEY_LEN, validate_key};
pub use memory::MemoryTier;

use async_trait::async_trait;

use crate::entry::{CacheEntry, CacheValue};
use crate::error::Result;
use crate::stats::{CacheStats, CapacityPolicy, TierCounters};

/// Uniform capability interface over heterogeneous tiers.
///
/// `get` never computes anything: a miss is reported immediately and the
/// caller decides whether to fetch and `set`. Only successfully computed
/// values should ever be passed to `set`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tiercache_core::tier::{CacheTier, MemoryTier};
///
/// # #[tokio::main]
/// # async fn main() -> tiercache_core::Result<()> {
/// let tier = MemoryTier::new("user-environment", None);
/// tier.set("42", json!({"region": "eu"})).await?;
///
/// let entry = tier.get("42").await.expect("entry present");
/// assert_eq!(entry.value()["region"], "eu");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Returns the unique tier name.
    fn name(&self) -> &str;

    /// Returns the capacity policy of this tier.
    fn policy(&self) -> CapacityPolicy;

    /// Returns the counters owned by this tier.
    fn counters(&self) -> &TierCounters;

    /// Looks up a key, recording a hit or a miss.
    ///
    /// Expired entries are never returned.
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Looks up a key without touching the hit/miss counters.
    async fn peek(&self, key: &str) -> Option<CacheEntry>;

    /// Writes a value unconditionally and returns the new version.
    ///
    /// The version is strictly greater than any version previously
    /// assigned by this tier.
    async fn set(&self, key: &str, value: CacheValue) -> Result<u64>;

    /// Removes a key. Returns whether an entry was present.
    ///
    /// Invalidating an absent key is a successful no-op.
    async fn invalidate(&self, key: &str) -> Result<bool>;

    /// Removes every entry and returns how many were removed.
    async fn clear(&self) -> Result<u64>;

    /// Snapshot of the live keys.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Number of live entries.
    async fn entry_count(&self) -> Result<u64>;

    /// Invalidates every key owned by the pattern's identifier.
    async fn invalidate_matching(&self, pattern: &KeyPattern) -> Result<usize> {
        let matching: Vec<String> = self
            .keys()
            .await?
            .into_iter()
            .filter(|key| pattern.matches(key))
            .collect();

        let mut removed = 0;
        for key in &matching {
            if self.invalidate(key).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Returns a snapshot of the tier counters.
    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.entry_count().await?;
        Ok(self.counters().snapshot(self.policy(), entries))
    }

    /// Drops expired entries eagerly. Returns how many were dropped.
    async fn purge_expired(&self) -> usize {
        0
    }
}
