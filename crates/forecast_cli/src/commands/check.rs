//! Check command implementation
//!
//! Validates the effective configuration and reports what a simulation
//! would run with.

use std::io::Write;
use std::path::Path;

use tracing::info;

use forecast_engine::PortfolioForecaster;

use crate::config::CliConfig;
use crate::{CliError, Result};

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");

    let forecaster = PortfolioForecaster::new(config.engine_config()?)?;
    let tickers = match &config.history_dir {
        Some(dir) => Some(available_tickers(dir)?),
        None => None,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "forecast {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "  Logical CPUs:   {}", num_cpus::get())?;
    writeln!(out, "  Workers:        {}", forecaster.workers())?;
    writeln!(out, "  Base seed:      {}", forecaster.seeds().base())?;
    writeln!(out, "  Display limit:  {}", config.display_limit)?;
    writeln!(out, "  Default model:  {:?}", config.default_distribution()?)?;
    writeln!(out, "  Output format:  {}", config.format)?;
    match (&config.history_dir, tickers) {
        (Some(dir), Some(tickers)) => {
            writeln!(out, "  History dir:    {}", dir.display())?;
            writeln!(out, "  History files:  {}", tickers.join(", "))?;
        }
        _ => writeln!(out, "  History dir:    (none)")?,
    }

    info!("Configuration OK");
    Ok(())
}

/// Tickers with a `<TICKER>.csv` file in `dir`, sorted.
pub fn available_tickers(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "history directory not found: {}",
            dir.display()
        )));
    }

    let mut tickers = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tickers.push(stem.to_string());
            }
        }
    }
    tickers.sort();
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_tickers() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["MSFT.csv", "AAPL.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "date,close\n").unwrap();
        }

        assert_eq!(available_tickers(dir.path()).unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_missing_history_dir() {
        assert!(matches!(
            available_tickers(Path::new("/nonexistent/history")),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
