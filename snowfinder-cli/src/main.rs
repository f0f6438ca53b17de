//! SnowFinder CLI - rank ski resorts by historical snowfall in a calendar window.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "snowfinder",
    version,
    about = "Seasonal snowfall rankings for ski resorts"
)]
struct Cli {
    #[command(subcommand)]
    command: snowfinder_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    snowfinder_cmd::run(cli.command).await
}
