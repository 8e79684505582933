//! Application state.

use std::sync::Arc;
use std::time::Duration;

use tiercache_core::CacheRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The registry of cache tiers.
    registry: Arc<CacheRegistry>,
    /// How long a warm request waits before reporting a timeout.
    warm_timeout: Duration,
}

impl AppState {
    /// Creates a new AppState around the given registry.
    pub fn new(registry: Arc<CacheRegistry>, warm_timeout: Duration) -> Self {
        Self {
            registry,
            warm_timeout,
        }
    }

    /// Returns a reference to the registry.
    pub fn registry(&self) -> &CacheRegistry {
        self.registry.as_ref()
    }

    pub fn warm_timeout(&self) -> Duration {
        self.warm_timeout
    }
}
