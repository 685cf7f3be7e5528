//! Forecast CLI - Monte Carlo portfolio forecasting
//!
//! # Commands
//!
//! - `forecast simulate --capital <C> --stock AAPL=60 --stock MSFT=40` -
//!   Run a forecast sequentially and in parallel and compare them
//! - `forecast check` - Validate configuration and report the environment
//!
//! # Configuration
//!
//! Settings come from, in increasing priority: built-in defaults, a TOML
//! file (`--config`), `FORECAST_*` environment variables and flags.
//! `RUST_LOG` overrides the configured log level.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod history;

pub use error::{CliError, Result};

use commands::simulate::{parse_stock, SimulateArgs};
use config::{build_config, CliArgs, OutputFormat};

/// Monte Carlo portfolio forecaster
#[derive(Parser)]
#[command(name = "forecast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast a portfolio with both runners
    Simulate {
        /// Capital invested on day 0
        #[arg(long)]
        capital: f64,

        /// Holding as TICKER=WEIGHT; repeat for each stock
        #[arg(short, long = "stock", value_parser = parse_stock, required = true)]
        stocks: Vec<(String, f64)>,

        /// Prediction horizon in days
        #[arg(short, long, default_value = "30")]
        days: usize,

        /// Number of Monte Carlo trials
        #[arg(short = 'n', long, default_value = "10000")]
        simulations: usize,

        /// Base seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Parallel worker threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Directory of <TICKER>.csv price histories
        #[arg(long, value_name = "DIR")]
        history_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Trajectories included in the output
        #[arg(long)]
        display_limit: Option<usize>,
    },

    /// Check configuration and environment
    Check,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut args = CliArgs {
        config_file: cli.config,
        log_level: cli.log_level,
        ..Default::default()
    };
    if let Commands::Simulate {
        seed,
        workers,
        history_dir,
        format,
        display_limit,
        ..
    } = &cli.command
    {
        args.seed = *seed;
        args.workers = *workers;
        args.history_dir = history_dir.clone();
        args.format = *format;
        args.display_limit = *display_limit;
    }

    let config = build_config(&args)?;
    init_tracing(config.log_level.as_filter_str());
    info!(
        log_level = %config.log_level,
        workers = ?config.workers,
        seed = ?config.seed,
        display_limit = config.display_limit,
        format = %config.format,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Simulate {
            capital,
            stocks,
            days,
            simulations,
            ..
        } => commands::simulate::run(
            &SimulateArgs {
                capital,
                stocks,
                days,
                simulations,
            },
            &config,
        ),
        Commands::Check => commands::check::run(&config),
    }
}
