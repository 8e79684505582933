//! Tiercache admin server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tiercache_core::registry::MaintenanceConfig;
use tiercache_server::{AppState, Settings, build_registry, run_server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional settings path as the first argument
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref()).context("Failed to load settings")?;
    let addr = settings.addr()?;

    tracing::info!("Starting tiercache server v{}", env!("CARGO_PKG_VERSION"));

    let prometheus_handle =
        tiercache_server::metrics::init_metrics().context("Failed to install metrics recorder")?;

    let registry = Arc::new(build_registry(&settings).context("Failed to build cache registry")?);
    tracing::info!(
        tiers = ?registry.names().collect::<Vec<_>>(),
        warm_timeout = ?settings.warm_timeout(),
        "Cache registry ready"
    );

    // Expired-entry sweep; stopped when the handle drops at shutdown
    let _maintenance = settings.purge_interval().map(|purge_interval| {
        registry.spawn_maintenance(MaintenanceConfig { purge_interval })
    });

    let state = AppState::new(registry, settings.warm_timeout());

    run_server(addr, state, prometheus_handle).await?;

    Ok(())
}
