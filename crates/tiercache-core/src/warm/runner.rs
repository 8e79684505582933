//! Bounded execution of a warm strategy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use metrics::histogram;
use tracing::{Instrument, info, warn};

use super::{WarmProgress, WarmResult, WarmStatus, WarmStrategy};
use crate::error::{CacheError, Result};
use crate::tier::CacheTier;

/// Clears the in-flight flag when the warm task ends, including on abort.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn summarize(
    tier: &str,
    outcome: Result<()>,
    progress: &WarmProgress,
    started: Instant,
) -> WarmResult {
    let mut errors = progress.errors();
    let status = match outcome {
        Ok(()) if errors.is_empty() => WarmStatus::Completed,
        Ok(()) => WarmStatus::Partial,
        Err(e) => {
            errors.push(e.to_string());
            WarmStatus::Failed
        },
    };

    WarmResult {
        tier: tier.to_string(),
        status,
        items_loaded: progress.items_loaded(),
        duration_ms: started.elapsed().as_millis() as u64,
        errors,
    }
}

fn record(tier: &dyn CacheTier, result: &WarmResult) {
    tier.counters()
        .record_warm(result.status, result.items_loaded);
    histogram!("tiercache_warm_duration_seconds", "tier" => result.tier.clone())
        .record(result.duration_ms as f64 / 1000.0);

    if result.status.is_failure() {
        warn!(
            tier = %result.tier,
            status = ?result.status,
            items_loaded = result.items_loaded,
            errors = result.errors.len(),
            "Warm finished with errors"
        );
    } else {
        info!(
            tier = %result.tier,
            items_loaded = result.items_loaded,
            duration_ms = result.duration_ms,
            "Warm completed"
        );
    }
}

/// Runs `strategy` against `tier` for at most `timeout`.
///
/// The strategy runs on its own task. If the caller stops waiting (for
/// example because the HTTP request was aborted) the task keeps running
/// to completion and still records its outcome on the tier. If the
/// timeout fires first, the task is stopped and the items loaded so far
/// are kept and reported.
///
/// `in_flight` guards against two concurrent warms of the same tier.
pub async fn run_warm(
    tier: Arc<dyn CacheTier>,
    strategy: Arc<dyn WarmStrategy>,
    in_flight: Arc<AtomicBool>,
    timeout: Duration,
) -> WarmResult {
    let name = tier.name().to_string();

    if in_flight
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        info!(tier = %name, "Warm already in flight");
        return WarmResult {
            tier: name,
            status: WarmStatus::AlreadyRunning,
            items_loaded: 0,
            duration_ms: 0,
            errors: Vec::new(),
        };
    }

    info!(tier = %name, source = %strategy.source(), ?timeout, "Starting warm");

    let started = Instant::now();
    let progress = Arc::new(WarmProgress::new());

    let task_tier = Arc::clone(&tier);
    let task_progress = Arc::clone(&progress);
    let mut task = tokio::spawn(
        async move {
            let _in_flight = InFlight(in_flight);
            let outcome = strategy.warm(task_tier.as_ref(), &task_progress).await;
            let result = summarize(task_tier.name(), outcome, &task_progress, started);
            record(task_tier.as_ref(), &result);
            result
        }
        .in_current_span(),
    );

    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            let result = summarize(
                &name,
                Err(CacheError::tier_operation(
                    &name,
                    format!("warm task aborted: {join_error}"),
                )),
                &progress,
                started,
            );
            record(tier.as_ref(), &result);
            result
        },
        Err(_) => {
            task.abort();

            let items_loaded = progress.items_loaded();
            let elapsed_ms = started.elapsed().as_millis() as u64;
            let mut errors = progress.errors();
            errors.push(
                CacheError::Timeout {
                    tier: name.clone(),
                    elapsed_ms,
                    items_loaded,
                }
                .to_string(),
            );

            let result = WarmResult {
                tier: name,
                status: WarmStatus::TimedOut,
                items_loaded,
                duration_ms: elapsed_ms,
                errors,
            };
            record(tier.as_ref(), &result);
            result
        },
    }
}
