//! Registries de prueba.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tiercache_core::entry::{CacheEntry, CacheValue};
use tiercache_core::stats::{CapacityPolicy, TierCounters};
use tiercache_core::tier::{BoundedTier, CacheTier, MemoryTier};
use tiercache_core::warm::{WarmProgress, WarmStrategy};
use tiercache_core::{CacheError, CacheRegistry, Result};
use tiercache_server::AppState;

/// Tier cuyo backend nunca responde.
pub struct UnreachableTier {
    name: String,
    counters: TierCounters,
}

impl UnreachableTier {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            counters: TierCounters::new(name),
        }
    }

    fn error(&self) -> CacheError {
        CacheError::tier_operation(&self.name, "connection refused")
    }
}

#[async_trait]
impl CacheTier for UnreachableTier {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> CapacityPolicy {
        CapacityPolicy::Unbounded { ttl_secs: None }
    }

    fn counters(&self) -> &TierCounters {
        &self.counters
    }

    async fn get(&self, _key: &str) -> Option<CacheEntry> {
        None
    }

    async fn peek(&self, _key: &str) -> Option<CacheEntry> {
        None
    }

    async fn set(&self, _key: &str, _value: CacheValue) -> Result<u64> {
        Err(self.error())
    }

    async fn invalidate(&self, _key: &str) -> Result<bool> {
        Err(self.error())
    }

    async fn clear(&self) -> Result<u64> {
        Err(self.error())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Err(self.error())
    }

    async fn entry_count(&self) -> Result<u64> {
        Err(self.error())
    }
}

/// Carga secrets fijos, con una demora opcional por item.
pub struct StaticSecrets {
    pub delay: Duration,
    pub fail: bool,
}

#[async_trait]
impl WarmStrategy for StaticSecrets {
    fn source(&self) -> &str {
        "static"
    }

    async fn warm(&self, tier: &dyn CacheTier, progress: &WarmProgress) -> Result<()> {
        if self.fail {
            return Err(CacheError::tier_operation(
                tier.name(),
                "secrets provider 'static': connection refused",
            ));
        }
        for (key, value) in [("db_password", json!("hunter2")), ("api_token", json!("tok"))] {
            tokio::time::sleep(self.delay).await;
            progress.load(tier, key, value).await;
        }
        Ok(())
    }
}

/// Registry `{user-environment, user-cases, global-cases, secrets}`, con
/// `unreachable` opcional al final.
pub fn test_registry(with_unreachable: bool, secrets: StaticSecrets) -> CacheRegistry {
    let mut builder = CacheRegistry::builder();
    builder
        .register(Arc::new(MemoryTier::new("user-environment", None)))
        .unwrap()
        .register(Arc::new(BoundedTier::new("user-cases", 100, None)))
        .unwrap()
        .register(Arc::new(BoundedTier::new("global-cases", 100, None)))
        .unwrap()
        .register(Arc::new(MemoryTier::new("secrets", None)))
        .unwrap()
        .key_scoped("user-environment")
        .unwrap()
        .key_scoped("user-cases")
        .unwrap()
        .warm_with("secrets", Arc::new(secrets))
        .unwrap();

    if with_unreachable {
        builder
            .register(Arc::new(UnreachableTier::new("unreachable")))
            .unwrap();
    }

    builder.build()
}

pub fn default_secrets() -> StaticSecrets {
    StaticSecrets {
        delay: Duration::ZERO,
        fail: false,
    }
}

/// Estado con el registry sano y un timeout de warm de 5 segundos.
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(test_registry(false, default_secrets())),
        Duration::from_secs(5),
    )
}
