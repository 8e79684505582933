use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tiercache_core::tier::{BoundedTier, CacheTier, MemoryTier};
use tiercache_core::warm::{WarmProgress, WarmStatus, WarmStrategy};
use tiercache_core::{CacheRegistry, Result};

async fn assert_versions_unique(tier: Arc<dyn CacheTier>) {
    let mut handles = Vec::new();
    for writer in 0..8 {
        let tier = Arc::clone(&tier);
        handles.push(tokio::spawn(async move {
            let mut versions = Vec::new();
            for i in 0..50 {
                versions.push(tier.set("42", json!({"writer": writer, "i": i})).await.unwrap());
            }
            versions
        }));
    }

    let mut all = HashSet::new();
    let mut highest = 0;
    for handle in handles {
        let versions = handle.await.unwrap();
        // Versions seen by one writer only grow
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        highest = highest.max(*versions.last().unwrap());
        all.extend(versions);
    }

    assert_eq!(all.len(), 400);
    assert_eq!(tier.peek("42").await.unwrap().version(), highest);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sets_memory_tier() {
    assert_versions_unique(Arc::new(MemoryTier::new("user-environment", None))).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sets_bounded_tier() {
    assert_versions_unique(Arc::new(BoundedTier::new("user-cases", 1_000, None))).await;
}

async fn assert_readers_see_whole_values(tier: Arc<dyn CacheTier>) {
    let value = json!({"cases": ["a", "b", "c"], "total": 3});
    tier.set("all", value.clone()).await.unwrap();

    let reader = {
        let tier = Arc::clone(&tier);
        let value = value.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                if let Some(entry) = tier.get("all").await {
                    assert_eq!(entry.value(), &value);
                }
                tokio::task::yield_now().await;
            }
        })
    };

    for _ in 0..50 {
        tier.clear().await.unwrap();
        tier.set("all", value.clone()).await.unwrap();
    }

    reader.await.unwrap();

    tier.clear().await.unwrap();
    assert!(tier.get("all").await.is_none());
    assert_eq!(tier.entry_count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_during_clear_memory_tier() {
    assert_readers_see_whole_values(Arc::new(MemoryTier::new("global-cases", None))).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_during_clear_bounded_tier() {
    assert_readers_see_whole_values(Arc::new(BoundedTier::new("global-cases", 1_000, None))).await;
}

struct SlowSeed;

#[async_trait]
impl WarmStrategy for SlowSeed {
    fn source(&self) -> &str {
        "seed"
    }

    async fn warm(&self, tier: &dyn CacheTier, progress: &WarmProgress) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        progress.load(tier, "db_password", json!("hunter2")).await;
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_warms_run_once() {
    let mut builder = CacheRegistry::builder();
    builder
        .register(Arc::new(MemoryTier::new("secrets", None)))
        .unwrap()
        .warm_with("secrets", Arc::new(SlowSeed))
        .unwrap();
    let registry = Arc::new(builder.build());

    let first = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.warm("secrets", Duration::from_secs(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = registry.warm("secrets", Duration::from_secs(5)).await.unwrap();
    let first = first.await.unwrap().unwrap();

    assert_eq!(first.status, WarmStatus::Completed);
    assert_eq!(second.status, WarmStatus::AlreadyRunning);
    assert_eq!(first.items_loaded, 1);

    // The flag is released once the run ends
    let again = registry.warm("secrets", Duration::from_secs(5)).await.unwrap();
    assert_eq!(again.status, WarmStatus::Completed);
}
