//! yardtrack - Main Entry Point
//!
//! Starts the REST API by default; subcommands cover offline prediction
//! and snapshot inspection.

use clap::Parser;
use yardtrack::cli::{cmd_info, cmd_predict, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yardtrack=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, host, data }) => {
            cmd_serve(&host, port, data.as_ref()).await?;
        }
        Some(Commands::Predict { data, position, marker, trainer, missing }) => {
            cmd_predict(&data, position, marker, &trainer, &missing).await?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(&data).await?;
        }
        None => {
            let config = yardtrack::server::ServerConfig::default();
            yardtrack::server::run_server(config).await?;
        }
    }

    Ok(())
}
