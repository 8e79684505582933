use clap::{Parser, Subcommand};

/// Default admin endpoint of a local server.
pub const DEFAULT_ADMIN_URL: &str = "http://localhost:8000";

#[derive(Parser, Debug)]
#[command(name = "tiercache")]
#[command(about = "Tiercache admin CLI: clear, inspect and warm the cache tiers of a running server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Admin base URL (overrides TIERCACHE_ADMIN_URL env var)
    #[arg(short, long, global = true, env = "TIERCACHE_ADMIN_URL", default_value = DEFAULT_ADMIN_URL)]
    pub url: String,

    /// Print requests and raw responses
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Request timeout in seconds
    #[arg(short, long, global = true, default_value_t = 60)]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clear every cache tier
    ClearAll,
    /// Clear one user's entries in the key-scoped tiers
    ClearUser(ClearUserArgs),
    /// Show aggregate stats for every tier
    Stats,
    /// Show per-user diagnostics plus aggregate stats
    StatsDetailed(StatsDetailedArgs),
    /// Warm a tier from its backing source
    Warm(WarmArgs),
    /// Clear every tier, then warm the secrets tier
    ClearAndWarm,
    /// Check server and cache health
    Health,
}

#[derive(clap::Args, Debug)]
pub struct ClearUserArgs {
    /// User identifier (e.g. 42)
    pub user_id: String,
}

#[derive(clap::Args, Debug)]
pub struct StatsDetailedArgs {
    /// User identifier to inspect
    pub user_id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct WarmArgs {
    /// Tier to warm
    #[arg(default_value = "secrets")]
    pub tier: String,
}
