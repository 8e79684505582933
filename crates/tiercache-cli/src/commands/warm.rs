use super::Outcome;
use super::cache::clear_all;
use crate::client::AdminClient;
use crate::error::CliError;
use crate::output::{print_error, print_warm_result};

pub async fn warm(client: &AdminClient, tier: &str) -> Result<Outcome, CliError> {
    let result = client.warm(tier).await?;
    print_warm_result(&result);
    Ok(Outcome::from_success(result.is_success()))
}

/// Clears every tier, then warms the secrets tier. Both steps always run.
///
/// An error in one step is printed as it happens and does not stop the other.
pub async fn clear_and_warm(client: &AdminClient) -> Result<Outcome, CliError> {
    println!("Step 1/2: clear-all");
    let cleared = step_outcome(clear_all(client).await);

    println!("Step 2/2: warm secrets");
    let warmed = step_outcome(warm(client, "secrets").await);

    let outcome = cleared.and(warmed);
    if outcome == Outcome::Failed {
        let failed_steps: Vec<&str> = [("clear-all", cleared), ("warm", warmed)]
            .into_iter()
            .filter(|(_, o)| *o == Outcome::Failed)
            .map(|(step, _)| step)
            .collect();
        print_error(&format!("clear-and-warm: failed step(s): {}", failed_steps.join(", ")));
    }
    Ok(outcome)
}

fn step_outcome(result: Result<Outcome, CliError>) -> Outcome {
    result.unwrap_or_else(|e| {
        print_error(&e.to_string());
        Outcome::Failed
    })
}
