use super::Outcome;
use crate::client::AdminClient;
use crate::error::CliError;
use crate::output::{print_clear_report, print_diagnostics, print_stats};

pub async fn clear_all(client: &AdminClient) -> Result<Outcome, CliError> {
    let report = client.clear_all().await?;
    print_clear_report(&report);
    Ok(Outcome::from_success(report.success))
}

pub async fn clear_user(client: &AdminClient, user_id: &str) -> Result<Outcome, CliError> {
    let report = client.clear_user(user_id).await?;
    print_clear_report(&report);
    Ok(Outcome::from_success(report.success))
}

pub async fn stats(client: &AdminClient) -> Result<Outcome, CliError> {
    let report = client.stats().await?;
    print_stats(&report);
    Ok(Outcome::from_success(report.degraded_tiers().is_empty()))
}

pub async fn stats_detailed(
    client: &AdminClient,
    user_id: Option<&str>,
) -> Result<Outcome, CliError> {
    let report = client.diagnostics(user_id).await?;
    print_diagnostics(&report);

    let lookup_failed = report.key_scoped.iter().any(|d| d.error.is_some());
    Ok(Outcome::from_success(
        report.aggregate.degraded_tiers().is_empty() && !lookup_failed,
    ))
}
