use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tiercache_core::registry::{
    ClearReport, DiagnosticsReport, OutcomeStatus, StatsReport, TierHealth,
};
use tiercache_core::stats::CapacityPolicy;
use tiercache_core::warm::{WarmResult, WarmStatus};

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "!".yellow(), msg);
}

/// Prints the failed tiers before anything else.
pub fn print_failure_summary(operation: &str, failed: &[&str]) {
    if !failed.is_empty() {
        print_error(&format!(
            "{operation}: {} tier(s) failed: {}",
            failed.len(),
            failed.join(", ")
        ));
    }
}

pub fn print_clear_report(report: &ClearReport) {
    print_failure_summary(&report.operation, &report.failed_tiers());

    for outcome in &report.tiers {
        match outcome.status {
            OutcomeStatus::Ok => println!(
                "  {} {}: removed {}",
                "✓".green(),
                outcome.tier.cyan(),
                outcome.removed
            ),
            OutcomeStatus::Skipped => {
                println!("  {} {}: skipped", "-".dimmed(), outcome.tier.dimmed())
            },
            OutcomeStatus::Failed => println!(
                "  {} {}: {}",
                "✗".red(),
                outcome.tier.cyan(),
                outcome.error.as_deref().unwrap_or("failed").red()
            ),
        }
    }

    if report.success {
        let scope = report
            .key
            .as_deref()
            .map(|key| format!(" for user '{key}'"))
            .unwrap_or_default();
        print_success(&format!(
            "{}{scope}: {} entries removed",
            report.operation,
            report.total_removed()
        ));
    }
}

fn format_policy(policy: &CapacityPolicy) -> String {
    let ttl = |ttl_secs: &Option<u64>| {
        ttl_secs
            .map(|s| format!("ttl {s}s"))
            .unwrap_or_else(|| "no ttl".to_string())
    };
    match policy {
        CapacityPolicy::Unbounded { ttl_secs } => format!("memory, {}", ttl(ttl_secs)),
        CapacityPolicy::Bounded {
            max_capacity,
            ttl_secs,
        } => format!("bounded {max_capacity}, {}", ttl(ttl_secs)),
    }
}

/// Renders per-tier stats as a table.
pub fn stats_table(report: &StatsReport) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "Tier",
        "Health",
        "Policy",
        "Entries",
        "Hits",
        "Misses",
        "Evictions",
        "Hit rate",
        "Last warm",
    ]);

    for entry in &report.tiers {
        let health = match entry.health {
            TierHealth::Ok => "ok".to_string(),
            TierHealth::Degraded => "degraded".to_string(),
        };
        match &entry.stats {
            Some(stats) => {
                let last_warm = stats
                    .last_warm
                    .as_ref()
                    .map(|w| format!("{:?} ({})", w.status, w.at.format("%H:%M:%S")))
                    .unwrap_or_else(|| "-".to_string());
                builder.push_record([
                    entry.tier.clone(),
                    health,
                    format_policy(&stats.policy),
                    stats.entries.to_string(),
                    stats.hits.to_string(),
                    stats.misses.to_string(),
                    stats.evictions.to_string(),
                    format!("{:.1}%", stats.hit_rate * 100.0),
                    last_warm,
                ]);
            },
            None => {
                let mut row = vec![entry.tier.clone(), health];
                row.push(entry.error.clone().unwrap_or_default());
                row.extend(std::iter::repeat_n("-".to_string(), 6));
                builder.push_record(row);
            },
        }
    }

    builder.build().with(Style::rounded()).to_string()
}

pub fn print_stats(report: &StatsReport) {
    print_failure_summary("stats", &report.degraded_tiers());

    println!("{table}", table = stats_table(report));
    println!(
        "{}: {} entries, {} hits, {} misses, {} evictions",
        "Total".cyan(),
        report.totals.entries,
        report.totals.hits,
        report.totals.misses,
        report.totals.evictions
    );
}

pub fn print_diagnostics(report: &DiagnosticsReport) {
    print_failure_summary("stats-detailed", &report.aggregate.degraded_tiers());

    if let Some(user_id) = &report.user_id {
        println!("{} {}", "User:".cyan(), user_id);
        for diag in &report.key_scoped {
            match (&diag.error, &diag.entry) {
                (Some(error), _) => {
                    println!("  {} {}: {}", "✗".red(), diag.tier.cyan(), error.red())
                },
                (None, Some(entry)) => println!(
                    "  {}: cached (version {}, created {}{}), {} matching key(s)",
                    diag.tier.cyan(),
                    entry.version,
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                    entry
                        .expires_at
                        .map(|at| format!(", expires {}", at.format("%H:%M:%S")))
                        .unwrap_or_default(),
                    diag.matching_keys
                ),
                (None, None) => println!(
                    "  {}: not cached, {} matching key(s)",
                    diag.tier.cyan(),
                    diag.matching_keys
                ),
            }
        }
        println!();
    }

    println!("{table}", table = stats_table(&report.aggregate));
}

pub fn print_warm_result(result: &WarmResult) {
    let summary = format!(
        "warm {}: {} items loaded in {}ms",
        result.tier, result.items_loaded, result.duration_ms
    );

    match result.status {
        WarmStatus::Completed => print_success(&summary),
        WarmStatus::NotSupported => {
            print_warning(&format!("warm {}: tier has no warm strategy", result.tier))
        },
        WarmStatus::AlreadyRunning => print_warning(&format!(
            "warm {}: another warm is already running",
            result.tier
        )),
        WarmStatus::Partial | WarmStatus::Failed | WarmStatus::TimedOut => {
            print_error(&format!("{summary} ({:?})", result.status));
            for error in &result.errors {
                eprintln!("  {}", error.red());
            }
        },
    }
}
