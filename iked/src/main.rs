//! # iked
//!
//! IKEv2 responder/initiator daemon

#![warn(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use clap::Parser;
use iked::config::Config;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

mod cli;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "iked=info,ike_core=info",
        1 => "iked=debug,ike_core=debug",
        _ => "iked=trace,ike_core=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let source = match std::fs::read_to_string(&cli.config) {
        Ok(source) => source,
        Err(err) => {
            tracing::error!("could not read {}: {err}", cli.config.display());
            return std::process::ExitCode::FAILURE;
        }
    };
    let config = match Config::from_toml(&source) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("could not parse {}: {err}", cli.config.display());
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Err(err) = iked::run(config).await {
        tracing::error!("{err}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
