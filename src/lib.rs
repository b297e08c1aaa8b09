pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::chart::ChartRequest;
use crate::core::config::AppConfig;
use crate::core::{CurrencyCode, FetchOutcome, PointIndexing};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments of a chart invocation as given on the command line.
#[derive(Debug, Clone)]
pub struct ChartArgs {
    pub currency: CurrencyCode,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub indexing: Option<PointIndexing>,
    pub output: Option<PathBuf>,
}

pub enum AppCommand {
    Chart(ChartArgs),
    Currencies,
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxchart starting...");
    let config = load_config(config_path)?;

    match command {
        AppCommand::Chart(args) => {
            chart(args, &config).await?;
        }
        AppCommand::Currencies => cli::currencies::run(&config.base_currency),
    }
    Ok(())
}

/// Runs one fetch-render cycle with settings resolved against `config`.
pub async fn chart(args: ChartArgs, config: &AppConfig) -> Result<FetchOutcome> {
    let source = providers::ExchangeRatesProvider::from_config(&config.providers.exchange_rates)?;
    let request = ChartRequest {
        output: args
            .output
            .unwrap_or_else(|| ChartRequest::default_output(&args.currency, &config.base_currency)),
        currency: args.currency,
        start: args.start,
        end: args.end,
        indexing: args.indexing.unwrap_or(config.indexing),
    };
    cli::chart::run(&request, &source, config).await
}
