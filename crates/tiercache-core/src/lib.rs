//! Tiercache Core - cache tiers, registry and warm orchestration
//!
//! This crate provides the cache tiers of the administration service, the
//! registry that operates on them uniformly, and the machinery that warms
//! a tier from its backing source within a time budget.

pub mod entry;
pub mod error;
pub mod registry;
pub mod stats;
pub mod tier;
pub mod warm;

pub use entry::{CacheEntry, CacheValue, EntryInfo};
pub use error::{CacheError, Result};
pub use registry::{CacheRegistry, RegistryBuilder};
pub use stats::{CacheStats, CapacityPolicy};
pub use tier::CacheTier;
pub use warm::{WarmResult, WarmStatus, WarmStrategy};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
