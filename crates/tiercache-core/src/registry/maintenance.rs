//! Background purge of expired entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use super::CacheRegistry;

/// Configuration for the maintenance task.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Interval between purge passes.
    pub purge_interval: Duration,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            purge_interval: Duration::from_secs(60),
        }
    }
}

/// Handle for a running maintenance task. Dropping it stops the task.
pub struct MaintenanceHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl MaintenanceHandle {
    /// Signals the task to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl CacheRegistry {
    /// Starts a task that periodically drops expired entries from every tier.
    pub fn spawn_maintenance(self: &Arc<Self>, config: MaintenanceConfig) -> MaintenanceHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(run(Arc::clone(self), config, shutdown_rx));
        MaintenanceHandle { shutdown_tx }
    }
}

async fn run(
    registry: Arc<CacheRegistry>,
    config: MaintenanceConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut timer = interval(config.purge_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick fires immediately
    timer.tick().await;

    info!(interval = ?config.purge_interval, "Starting cache maintenance");

    loop {
        tokio::select! {
            _ = timer.tick() => {
                let purged = registry.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "Purged expired entries");
                }
            }
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    info!("Cache maintenance shutting down");
                    break;
                }
            }
        }
    }
}
