use colored::Colorize;

use super::Outcome;
use crate::client::HealthStatus;
use crate::output::{print_failure_summary, print_success};

/// Reports the health fetched by the connectivity check.
pub fn health(base_url: &str, status: &HealthStatus) -> Outcome {
    let degraded: Vec<&str> = status.cache.degraded.iter().map(String::as_str).collect();
    print_failure_summary("health", &degraded);

    if degraded.is_empty() {
        print_success(&format!("{} is {}", base_url.cyan(), "healthy".green()));
    } else {
        println!("{} {} is {}", "!".yellow(), base_url.cyan(), status.status.yellow());
    }
    println!(
        "  {}: {} ({} tiers)",
        "Cache".cyan(),
        status.cache.status,
        status.cache.tiers
    );
    if let Some(version) = &status.version {
        println!("  {}: {}", "Version".cyan(), version);
    }

    Outcome::from_success(degraded.is_empty())
}
