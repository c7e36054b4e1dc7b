//! CloudSentry - Cloud monitoring configuration orchestrator
//!
//! Main entry point for the CloudSentry CLI and API server.

mod cli;
mod commands;
mod server;

use clap::Parser;
use tracing::error;

use cloudsentry_config::ConfigLoader;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    server::init_tracing(&config.logging)?;

    let result = match cli.command {
        None => server::run_server(config, None, None).await,
        Some(Commands::Serve { host, port }) => server::run_server(config, host, port).await,
        Some(Commands::Services) => commands::services(),
        Some(Commands::Metrics { service }) => commands::metrics(&service),
        Some(Commands::Regions) => commands::regions(&config).await,
        Some(Commands::Discover { service }) => commands::discover(&config, &service).await,
        Some(Commands::Configure { request, keys }) => {
            commands::configure(&config, &request, &keys).await
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
