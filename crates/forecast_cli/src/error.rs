//! Error types for the forecast CLI.

use thiserror::Error;

use crate::config::ConfigError;
use crate::history::HistoryError;
use forecast_engine::EngineError;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Historical price loading error
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Invalid command line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CSV output error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
