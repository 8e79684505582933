//! Warm strategy that loads a secrets provider into a tier.

use std::sync::Arc;

use async_trait::async_trait;
use tiercache_core::tier::CacheTier;
use tiercache_core::warm::{WarmProgress, WarmStrategy};
use tiercache_core::{CacheError, Result};
use tracing::{debug, warn};

use crate::secrets::SecretsProvider;

/// Lists the provider and writes every secret into the tier.
///
/// An unreachable provider fails the whole run with the provider's detail.
/// A secret that cannot be fetched is recorded as an item error and the
/// rest are still loaded. There is no retry.
pub struct SecretsWarmer {
    provider: Arc<dyn SecretsProvider>,
}

impl SecretsWarmer {
    pub fn new(provider: Arc<dyn SecretsProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WarmStrategy for SecretsWarmer {
    fn source(&self) -> &str {
        self.provider.name()
    }

    async fn warm(&self, tier: &dyn CacheTier, progress: &WarmProgress) -> Result<()> {
        let names = self.provider.list().await.map_err(|e| {
            warn!(provider = %self.provider.name(), error = %e, "Secrets provider unreachable");
            CacheError::tier_operation(
                tier.name(),
                format!("secrets provider '{}': {e}", self.provider.name()),
            )
        })?;

        debug!(provider = %self.provider.name(), count = names.len(), "Loading secrets");

        for name in names {
            match self.provider.fetch(&name).await {
                Ok(value) => progress.load(tier, &name, value).await,
                Err(e) => progress.record_error(format!("{name}: {e}")),
            }
        }

        Ok(())
    }
}
