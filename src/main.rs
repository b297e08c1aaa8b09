use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxchart::core::log::init_logging;
use fxchart::core::range::parse_bound;
use fxchart::core::{CurrencyCode, PointIndexing};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List supported currency codes
    Currencies,
    /// Chart historical exchange rates for a currency
    Chart {
        /// Currency code, e.g. USD
        #[arg(short = 'C', long)]
        currency: CurrencyCode,

        /// Start date as dd/mm/yyyy, yyyy-mm-dd or epoch seconds
        #[arg(short, long, value_parser = parse_bound)]
        start: Option<i64>,

        /// End date as dd/mm/yyyy, yyyy-mm-dd or epoch seconds
        #[arg(short, long, value_parser = parse_bound)]
        end: Option<i64>,

        /// Place points by date (timestamp) or by position (ordinal)
        #[arg(short, long)]
        indexing: Option<PointIndexing>,

        /// Where to write the SVG chart
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxchart::cli::setup::setup(),
        Some(Commands::Currencies) => {
            fxchart::run_command(
                fxchart::AppCommand::Currencies,
                cli.config_path.as_deref(),
            )
            .await
        }
        Some(Commands::Chart {
            currency,
            start,
            end,
            indexing,
            output,
        }) => {
            let args = fxchart::ChartArgs {
                currency,
                start,
                end,
                indexing,
                output,
            };
            fxchart::run_command(
                fxchart::AppCommand::Chart(args),
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
