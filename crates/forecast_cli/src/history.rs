//! Historical closing prices and per-ticker calibration.
//!
//! A history file is `<dir>/<TICKER>.csv` with a header row; the first column
//! is the date and the second the closing price. Dates are accepted as
//! `2024-01-02 00:00:00-05:00` or `2024-01-02`. Rows are ordered by date and
//! a repeated date keeps its last price.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use thiserror::Error;
use tracing::{debug, info, warn};

use forecast_engine::calibration;
use forecast_engine::{EngineError, MarketModel, PortfolioAllocation, ReturnDistribution};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// History loading errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// File could not be read or is not valid CSV
    #[error("{path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row has fewer than two columns
    #[error("{path}: line {line} has {found} column(s), expected date and close")]
    MissingColumn {
        path: PathBuf,
        line: u64,
        found: usize,
    },

    /// Unparseable date
    #[error("{path}: line {line}: invalid date {value:?}")]
    InvalidDate {
        path: PathBuf,
        line: u64,
        value: String,
    },

    /// Unparseable price
    #[error("{path}: line {line}: invalid close price {value:?}")]
    InvalidPrice {
        path: PathBuf,
        line: u64,
        value: String,
    },

    /// Prices could not be calibrated
    #[error("{ticker}: {source}")]
    Calibration {
        ticker: String,
        #[source]
        source: EngineError,
    },
}

/// Parses a history date in either accepted format.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(value, DATE_FORMAT))
        .ok()
}

/// Path of a ticker's history file.
pub fn history_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}.csv", ticker))
}

/// Loads a history file as date-ordered closing prices.
pub fn load_prices(path: &Path) -> Result<BTreeMap<NaiveDate, f64>, HistoryError> {
    let csv_err = |source| HistoryError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut prices = BTreeMap::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map_or(0, |p| p.line());

        let (date, close) = match (record.get(0), record.get(1)) {
            (Some(date), Some(close)) => (date, close),
            _ => {
                return Err(HistoryError::MissingColumn {
                    path: path.to_path_buf(),
                    line,
                    found: record.len(),
                })
            }
        };
        let date = parse_date(date).ok_or_else(|| HistoryError::InvalidDate {
            path: path.to_path_buf(),
            line,
            value: date.to_string(),
        })?;
        let close: f64 = close.parse().map_err(|_| HistoryError::InvalidPrice {
            path: path.to_path_buf(),
            line,
            value: close.to_string(),
        })?;

        prices.insert(date, close);
    }

    debug!(path = %path.display(), rows = prices.len(), "history loaded");
    Ok(prices)
}

/// Calibrates one ticker from its history file.
pub fn calibrate_ticker(dir: &Path, ticker: &str) -> Result<ReturnDistribution, HistoryError> {
    let prices = load_prices(&history_path(dir, ticker))?;
    let closes: Vec<f64> = prices.into_values().collect();

    let estimate = calibration::estimate(&closes).map_err(|source| HistoryError::Calibration {
        ticker: ticker.to_string(),
        source,
    })?;
    info!(
        ticker,
        drift = estimate.drift,
        volatility = estimate.volatility,
        observations = estimate.observations,
        "ticker calibrated"
    );

    estimate
        .distribution()
        .map_err(|source| HistoryError::Calibration {
            ticker: ticker.to_string(),
            source,
        })
}

/// Builds the market model for `allocation`.
///
/// Tickers with a history file in `dir` are calibrated from it; the rest use
/// `default`.
pub fn market_model(
    dir: Option<&Path>,
    allocation: &PortfolioAllocation,
    default: ReturnDistribution,
) -> Result<MarketModel, HistoryError> {
    let mut market = MarketModel::new(default);
    let Some(dir) = dir else {
        return Ok(market);
    };

    for ticker in allocation.tickers() {
        if history_path(dir, ticker).is_file() {
            market.insert(ticker, calibrate_ticker(dir, ticker)?);
        } else {
            warn!(ticker, dir = %dir.display(), "no history file, using default model");
        }
    }
    Ok(market)
}
