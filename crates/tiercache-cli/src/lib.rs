//! Tiercache CLI - admin client for a running tiercache server
//!
//! Every invocation first checks that the admin endpoint answers, so an
//! unreachable server is reported before any cache operation is attempted.

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod output;

use std::time::Duration;

use cli::{Cli, Commands};
use client::AdminClient;
use commands::Outcome;
use error::{CliError, EXIT_FAILURE, EXIT_OK};
use output::print_error;

async fn execute(cli: &Cli) -> Result<Outcome, CliError> {
    let client = AdminClient::new(&cli.url, Duration::from_secs(cli.timeout), cli.verbose)?;

    // Connectivity check before any command-specific action
    let health = client
        .health()
        .await
        .map_err(|e| e.into_unreachable(client.base_url()))?;

    match &cli.command {
        Commands::Health => Ok(commands::health::health(client.base_url(), &health)),
        Commands::ClearAll => commands::cache::clear_all(&client).await,
        Commands::ClearUser(args) => commands::cache::clear_user(&client, &args.user_id).await,
        Commands::Stats => commands::cache::stats(&client).await,
        Commands::StatsDetailed(args) => {
            commands::cache::stats_detailed(&client, args.user_id.as_deref()).await
        },
        Commands::Warm(args) => commands::warm::warm(&client, &args.tier).await,
        Commands::ClearAndWarm => commands::warm::clear_and_warm(&client).await,
    }
}

/// Runs a parsed command and returns the process exit code.
pub async fn run(cli: Cli) -> i32 {
    match execute(&cli).await {
        Ok(Outcome::Success) => EXIT_OK,
        Ok(Outcome::Failed) => EXIT_FAILURE,
        Err(e) => {
            print_error(&e.to_string());
            e.exit_code()
        },
    }
}
