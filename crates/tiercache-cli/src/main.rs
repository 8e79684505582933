use clap::Parser;
use tiercache_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = tiercache_cli::run(cli).await;
    std::process::exit(code);
}
