//! mica-cli - query the occurrence dashboard endpoints from the command line.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "mica-cli",
    version,
    about = "Occurrence counts, histograms and exports from the dashboard API"
)]
struct Cli {
    #[command(subcommand)]
    command: mica_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    mica_cmd::run(cli.command).await
}
