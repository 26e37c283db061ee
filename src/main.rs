//! Grouper CLI entry point.

use anyhow::Result;
use clap::Parser;

use grouper::cli::{commands, handle_error, Cli, Commands};
use grouper::domain::models::Config;
use grouper::infrastructure::config::ConfigLoader;
use grouper::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Focus(args) => commands::focus::execute(args, config, cli.json).await,
        Commands::Participants(args) => {
            commands::participants::execute(args, &config, cli.json).await
        }
        Commands::Config => commands::config::execute(&config, cli.json),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
