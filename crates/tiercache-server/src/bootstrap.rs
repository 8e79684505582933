//! Builds the cache registry from settings.

use std::sync::Arc;

use tiercache_core::CacheRegistry;
use tiercache_core::tier::{BoundedTier, CacheTier, MemoryTier};
use tiercache_sources::{EnvSecretsProvider, FileSecretsProvider, SecretsProvider, SecretsWarmer};
use tracing::info;

use crate::settings::{
    SecretsProviderKind, SecretsSettings, Settings, SettingsError, TierKind, TierSettings,
    WarmSource,
};

fn build_tier(tier: &TierSettings) -> Arc<dyn CacheTier> {
    match tier.kind {
        TierKind::Memory => Arc::new(MemoryTier::new(&tier.name, tier.ttl())),
        TierKind::Bounded => Arc::new(BoundedTier::new(
            &tier.name,
            tier.max_capacity.unwrap_or(0),
            tier.ttl(),
        )),
    }
}

/// Builds the configured secrets provider.
pub fn build_secrets_provider(
    secrets: &SecretsSettings,
) -> Result<Arc<dyn SecretsProvider>, SettingsError> {
    match (secrets.provider, &secrets.file) {
        (SecretsProviderKind::Env, _) => {
            Ok(Arc::new(EnvSecretsProvider::from_env(&secrets.env_prefix)))
        },
        (SecretsProviderKind::File, Some(path)) => Ok(Arc::new(FileSecretsProvider::new(path))),
        (SecretsProviderKind::File, None) => Err(SettingsError::Invalid(
            "secrets.file is required when secrets.provider = \"file\"".to_string(),
        )),
    }
}

/// Registers every configured tier, its key scope and its warm strategy.
///
/// Tier names must be unique; a duplicate fails the whole startup.
pub fn build_registry(settings: &Settings) -> Result<CacheRegistry, SettingsError> {
    let invalid = |e: tiercache_core::CacheError| SettingsError::Invalid(e.to_string());
    let mut builder = CacheRegistry::builder();

    let needs_secrets = settings
        .tiers
        .iter()
        .any(|t| t.warm == Some(WarmSource::Secrets));
    let secrets = if needs_secrets {
        let provider = build_secrets_provider(&settings.secrets)?;
        info!(provider = %provider.name(), "Secrets provider configured");
        Some(Arc::new(SecretsWarmer::new(provider)))
    } else {
        None
    };

    for tier in &settings.tiers {
        builder.register(build_tier(tier)).map_err(invalid)?;

        if tier.key_scoped {
            builder.key_scoped(&tier.name).map_err(invalid)?;
        }
        if let (Some(WarmSource::Secrets), Some(warmer)) = (tier.warm, &secrets) {
            builder
                .warm_with(&tier.name, Arc::clone(warmer) as _)
                .map_err(invalid)?;
        }
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = build_registry(&Settings::default()).unwrap();

        assert_eq!(registry.len(), 4);
        assert!(registry.is_key_scoped("user-environment").unwrap());
        assert!(registry.is_key_scoped("user-cases").unwrap());
        assert!(!registry.is_key_scoped("global-cases").unwrap());
        assert!(!registry.is_key_scoped("secrets").unwrap());
    }

    #[test]
    fn test_duplicate_tier_fails() {
        let mut settings = Settings::default();
        let duplicate = settings.tiers[0].clone();
        settings.tiers.push(duplicate);

        let err = build_registry(&settings).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn test_secrets_tier_is_warmable() {
        let registry = build_registry(&Settings::default()).unwrap();
        let stats = registry.stats_all().await;

        assert!(stats.tier("secrets").unwrap().warmable);
        assert!(!stats.tier("user-cases").unwrap().warmable);
    }
}
