//! CLI configuration management
//!
//! Handles loading configuration from TOML files, `FORECAST_*` environment
//! variables and command line arguments.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use forecast_engine::engine::{EngineConfig, MAX_DISPLAY_LIMIT};
use forecast_engine::mc::MAX_WORKERS;
use forecast_engine::model::{DEFAULT_DAILY_DRIFT, DEFAULT_DAILY_VOLATILITY};
use forecast_engine::{EngineError, ReturnDistribution};

/// Prefix of every environment variable read by the CLI.
pub const ENV_PREFIX: &str = "FORECAST_";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid output format: {0}. Must be one of: table, json, csv")]
    InvalidFormat(String),

    #[error("Invalid worker count: {0}. Must be between 1 and {max}", max = MAX_WORKERS)]
    InvalidWorkers(usize),

    #[error("Invalid display limit: {0}. Must be at most {max}", max = MAX_DISPLAY_LIMIT)]
    InvalidDisplayLimit(usize),

    #[error("Invalid return model: {0}")]
    InvalidModel(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Output formats for simulation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary table
    #[default]
    Table,
    /// Client response as JSON
    Json,
    /// Display trajectories as CSV, one row per trajectory
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Parallel worker threads; one per logical CPU when absent
    pub workers: Option<usize>,
    /// Base seed; drawn from OS entropy when absent
    pub seed: Option<u64>,
    /// Trajectories returned for display
    pub display_limit: usize,
    /// Directory holding `<TICKER>.csv` price histories
    pub history_dir: Option<PathBuf>,
    /// Output format
    pub format: OutputFormat,
    /// Default daily log-return drift for uncalibrated tickers
    pub drift: f64,
    /// Default daily log-return volatility for uncalibrated tickers
    pub volatility: f64,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            workers: None,
            seed: None,
            display_limit: forecast_engine::result::DEFAULT_DISPLAY_LIMIT,
            history_dir: None,
            format: OutputFormat::Table,
            drift: DEFAULT_DAILY_DRIFT,
            volatility: DEFAULT_DAILY_VOLATILITY,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}{}={:?}", ENV_PREFIX, key, value)))
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: CliConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides from `lookup`, which maps an unprefixed key such as
    /// `WORKERS` to its value
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(workers) = lookup("WORKERS") {
            self.workers = Some(parse_env("WORKERS", &workers)?);
        }
        if let Some(seed) = lookup("SEED") {
            self.seed = Some(parse_env("SEED", &seed)?);
        }
        if let Some(limit) = lookup("DISPLAY_LIMIT") {
            self.display_limit = parse_env("DISPLAY_LIMIT", &limit)?;
        }
        if let Some(dir) = lookup("HISTORY_DIR") {
            self.history_dir = Some(PathBuf::from(dir));
        }
        if let Some(format) = lookup("FORMAT") {
            self.format = OutputFormat::from_str(&format)?;
        }
        if let Some(drift) = lookup("DRIFT") {
            self.drift = parse_env("DRIFT", &drift)?;
        }
        if let Some(volatility) = lookup("VOLATILITY") {
            self.volatility = parse_env("VOLATILITY", &volatility)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        if cli.workers.is_some() {
            self.workers = cli.workers;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if let Some(limit) = cli.display_limit {
            self.display_limit = limit;
        }
        if cli.history_dir.is_some() {
            self.history_dir = cli.history_dir.clone();
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Err(ConfigError::InvalidWorkers(workers));
            }
        }
        if self.display_limit > MAX_DISPLAY_LIMIT {
            return Err(ConfigError::InvalidDisplayLimit(self.display_limit));
        }
        self.default_distribution()?;
        Ok(())
    }

    /// Return model for tickers without history
    pub fn default_distribution(&self) -> Result<ReturnDistribution, ConfigError> {
        ReturnDistribution::log_normal(self.drift, self.volatility)
            .map_err(|e| ConfigError::InvalidModel(e.to_string()))
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> Result<EngineConfig, EngineError> {
        let mut builder = EngineConfig::builder()
            .display_limit(self.display_limit)
            .default_distribution(ReturnDistribution::LogNormal {
                drift: self.drift,
                volatility: self.volatility,
            });
        if let Some(workers) = self.workers {
            builder = builder.workers(workers);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }
}

/// Command line overrides
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Worker count override
    pub workers: Option<usize>,
    /// Seed override
    pub seed: Option<u64>,
    /// Display limit override
    pub display_limit: Option<usize>,
    /// History directory override
    pub history_dir: Option<PathBuf>,
    /// Output format override
    pub format: Option<OutputFormat>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with(cli, |key| {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    })
}

/// [`build_config`] with an explicit environment lookup
pub fn build_config_with<F>(cli: &CliArgs, lookup: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    config.apply_env_with(lookup)?;
    config.merge_with_cli(cli)?;

    config.validate()?;
    Ok(config)
}
