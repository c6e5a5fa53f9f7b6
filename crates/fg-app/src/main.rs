mod cli;
mod commands;
mod config;
mod error;
mod events;
mod output;
mod shell;
mod state;

use std::sync::Arc;

use clap::Parser;
use fg_client::HttpFaceApi;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    config.apply_cli(&cli);

    if let Command::Attributes = cli.command {
        print!("{}", commands::attribute_listing(config.language));
        return Ok(());
    }

    info!("Using face generation service at {}", config.api_url);
    let api = HttpFaceApi::new(config.client_config())?;
    let mut state = AppState::new(Arc::new(api), &config);

    let result = match cli.command {
        Command::Prompt { text, steps, output } => commands::prompt(&mut state, text, steps, output).await,
        Command::Face(args) => commands::face(&mut state, args).await,
        Command::Shell => shell::run(&mut state).await,
        Command::Attributes => Ok(()),
    };

    state.shutdown();
    result
}
