// src/main.rs
use anyhow::Result;
use clap::Parser;
use defence_chart_aggregator::cli::{execute_command, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize environment
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    execute_command(cli)
}
