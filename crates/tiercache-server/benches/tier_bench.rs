use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tiercache_core::tier::{BoundedTier, CacheTier, MemoryTier};
use tokio::runtime::Runtime;

/// Crea un valor de prueba con N campos
fn create_test_value(num_fields: usize) -> Value {
    let fields: serde_json::Map<String, Value> = (0..num_fields)
        .map(|i| (format!("field.{i}"), json!(format!("value-{i}"))))
        .collect();
    Value::Object(fields)
}

/// Los dos tipos de tier, con el mismo nombre en el reporte
fn tiers() -> Vec<(&'static str, Arc<dyn CacheTier>)> {
    vec![
        ("memory", Arc::new(MemoryTier::new("bench", None))),
        ("bounded", Arc::new(BoundedTier::new("bench", 100_000, None))),
    ]
}

/// Benchmark: get (hit) por tipo de tier
fn bench_tier_get_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("tier_get_hit");

    for (kind, tier) in tiers() {
        rt.block_on(async {
            tier.set("42", create_test_value(100)).await.unwrap();
        });

        group.bench_function(kind, |b| {
            b.to_async(&rt).iter(|| async {
                let result = tier.get("42").await;
                std::hint::black_box(result)
            });
        });
    }

    group.finish();
}

/// Benchmark: get (miss)
fn bench_tier_get_miss(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("tier_get_miss");

    for (kind, tier) in tiers() {
        group.bench_function(kind, |b| {
            b.to_async(&rt).iter(|| async {
                let result = tier.get("nonexistent").await;
                std::hint::black_box(result)
            });
        });
    }

    group.finish();
}

/// Benchmark: set con diferentes tamanos de valor
fn bench_tier_set_sizes(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("tier_set_sizes");

    for (kind, tier) in tiers() {
        for size in [10, 100, 1000] {
            let value = Arc::new(create_test_value(size));
            let counter = Arc::new(AtomicU64::new(0));

            group.throughput(Throughput::Elements(1));
            group.bench_with_input(BenchmarkId::new(kind, size), &size, |b, _size| {
                b.to_async(&rt).iter(|| {
                    let tier = Arc::clone(&tier);
                    let value = Arc::clone(&value);
                    let counter = Arc::clone(&counter);
                    async move {
                        let count = counter.fetch_add(1, Ordering::Relaxed);
                        tier.set(&format!("user-{count}"), (*value).clone())
                            .await
                            .unwrap()
                    }
                });
            });
        }
    }

    group.finish();
}

/// Benchmark: 100 gets concurrentes sobre 1000 entries
fn bench_tier_concurrent_gets(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("tier_concurrent_gets_100");

    for (kind, tier) in tiers() {
        rt.block_on(async {
            for i in 0..1000 {
                tier.set(&format!("user-{i}"), create_test_value(10))
                    .await
                    .unwrap();
            }
        });

        group.bench_function(kind, |b| {
            b.to_async(&rt).iter(|| {
                let tier = Arc::clone(&tier);
                async move {
                    let handles: Vec<_> = (0..100)
                        .map(|i| {
                            let tier = Arc::clone(&tier);
                            tokio::spawn(async move { tier.get(&format!("user-{}", i * 7 % 1000)).await })
                        })
                        .collect();

                    for handle in handles {
                        let _ = handle.await;
                    }
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tier_get_hit,
    bench_tier_get_miss,
    bench_tier_set_sizes,
    bench_tier_concurrent_gets,
);

criterion_main!(benches);
