//! Top-level forecasting facade.
//!
//! [`PortfolioForecaster`] validates a request, runs it once sequentially and
//! once in parallel, times both, and assembles the [`SimulationResult`].

use tracing::{info, info_span};

use crate::error::{EngineError, Result};
use crate::mc::{ParallelRunner, SequentialRunner, MAX_WORKERS};
use crate::model::{MarketModel, ReturnDistribution, SimulationRequest};
use crate::result::{ResultAssembler, SimulationResult, DEFAULT_DISPLAY_LIMIT};
use crate::rng::SeedSource;
use crate::timing::time_runner;

/// Maximum number of display trajectories.
pub const MAX_DISPLAY_LIMIT: usize = 10_000;

/// Engine configuration.
///
/// Use [`EngineConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::engine::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .workers(4)
///     .display_limit(10)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.workers(), Some(4));
/// assert_eq!(config.display_limit(), 10);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Parallel worker threads; `None` means one per logical CPU.
    workers: Option<usize>,
    /// Trajectories kept for display.
    display_limit: usize,
    /// Base seed; `None` draws one from OS entropy.
    seed: Option<u64>,
    /// Return model for tickers without calibration.
    default_distribution: ReturnDistribution,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            seed: None,
            default_distribution: ReturnDistribution::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Configured worker count.
    #[inline]
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    /// Number of trajectories returned for display.
    #[inline]
    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// Configured base seed.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Default return model.
    #[inline]
    pub fn default_distribution(&self) -> &ReturnDistribution {
        &self.default_distribution
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if:
    /// - `workers` is 0 or greater than [`MAX_WORKERS`]
    /// - `display_limit` is greater than [`MAX_DISPLAY_LIMIT`]
    /// - the default distribution is invalid
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Err(EngineError::invalid(
                    "workers",
                    format!("must be in range [1, {}], got {}", MAX_WORKERS, workers),
                ));
            }
        }
        if self.display_limit > MAX_DISPLAY_LIMIT {
            return Err(EngineError::invalid(
                "display_limit",
                format!(
                    "must be at most {}, got {}",
                    MAX_DISPLAY_LIMIT, self.display_limit
                ),
            ));
        }
        self.default_distribution.validate()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    workers: Option<usize>,
    display_limit: Option<usize>,
    seed: Option<u64>,
    default_distribution: Option<ReturnDistribution>,
}

impl EngineConfigBuilder {
    /// Sets the number of parallel workers, in [1, 1024].
    #[inline]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets the number of trajectories kept for display.
    #[inline]
    pub fn display_limit(mut self, limit: usize) -> Self {
        self.display_limit = Some(limit);
        self
    }

    /// Sets the base seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the default return model.
    #[inline]
    pub fn default_distribution(mut self, dist: ReturnDistribution) -> Self {
        self.default_distribution = Some(dist);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::validate`].
    pub fn build(self) -> Result<EngineConfig> {
        let config = EngineConfig {
            workers: self.workers,
            display_limit: self.display_limit.unwrap_or(DEFAULT_DISPLAY_LIMIT),
            seed: self.seed,
            default_distribution: self.default_distribution.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Runs forecasting requests.
///
/// Holds the thread pool and the process-wide seed source; no state is kept
/// between requests beyond the seed counter.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::engine::{EngineConfig, PortfolioForecaster};
/// use forecast_engine::model::{PortfolioAllocation, SimulationRequest};
///
/// let config = EngineConfig::builder().workers(2).seed(7).build().unwrap();
/// let forecaster = PortfolioForecaster::new(config).unwrap();
///
/// let allocation = PortfolioAllocation::new([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
/// let request = SimulationRequest::new(10_000.0, allocation, 30, 500).unwrap();
///
/// let result = forecaster.forecast(&request, &forecaster.default_market()).unwrap();
/// assert_eq!(result.trajectories().len(), 30);
/// assert!(result.sequential_mean() > 0.0);
/// ```
#[derive(Debug)]
pub struct PortfolioForecaster {
    config: EngineConfig,
    sequential: SequentialRunner,
    parallel: ParallelRunner,
    seeds: SeedSource,
    assembler: ResultAssembler,
}

impl PortfolioForecaster {
    /// Creates a forecaster and its worker pool.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an invalid configuration, `ThreadPool` if the
    /// workers cannot be spawned.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let parallel = match config.workers {
            Some(workers) => ParallelRunner::new(workers)?,
            None => ParallelRunner::with_available_parallelism()?,
        };
        let seeds = match config.seed {
            Some(seed) => SeedSource::new(seed),
            None => SeedSource::from_entropy(),
        };
        info!(
            workers = parallel.pool_size(),
            base_seed = seeds.base(),
            display_limit = config.display_limit,
            "forecaster ready"
        );
        Ok(Self {
            assembler: ResultAssembler::new(config.display_limit),
            config,
            sequential: SequentialRunner,
            parallel,
            seeds,
        })
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Worker threads available to the parallel runner.
    #[inline]
    pub fn workers(&self) -> usize {
        self.parallel.pool_size()
    }

    /// Seed source shared by both runners.
    #[inline]
    pub fn seeds(&self) -> &SeedSource {
        &self.seeds
    }

    /// Market model using only the configured default distribution.
    pub fn default_market(&self) -> MarketModel {
        MarketModel::new(self.config.default_distribution)
    }

    /// Runs `request` with both runners and assembles the result.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the request or market is invalid (nothing is
    /// run in that case), otherwise any runner failure.
    pub fn forecast(
        &self,
        request: &SimulationRequest,
        market: &MarketModel,
    ) -> Result<SimulationResult> {
        request.validate()?;
        market.validate()?;

        let span = info_span!(
            "forecast",
            n_simulations = request.num_simulations(),
            days = request.days_to_predict(),
            stocks = request.allocation().len(),
        );
        let _guard = span.enter();

        let sequential = time_runner(&self.sequential, request, market, &self.seeds)?;
        let parallel = time_runner(&self.parallel, request, market, &self.seeds)?;
        let result = self.assembler.assemble(sequential, parallel);

        info!(
            speedup = result.comparison().speedup,
            improvement_pct = result.comparison().improvement_pct,
            "forecast completed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PortfolioAllocation;

    fn request(n: usize) -> SimulationRequest {
        let allocation = PortfolioAllocation::new([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
        SimulationRequest::new(10_000.0, allocation, 20, n).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let config = EngineConfig::builder().build().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.display_limit(), DEFAULT_DISPLAY_LIMIT);
        assert_eq!(config.workers(), None);
        assert_eq!(config.seed(), None);
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert!(EngineConfig::builder().workers(0).build().is_err());
        assert!(EngineConfig::builder()
            .workers(MAX_WORKERS + 1)
            .build()
            .is_err());
        assert!(EngineConfig::builder()
            .display_limit(MAX_DISPLAY_LIMIT + 1)
            .build()
            .is_err());
        assert!(EngineConfig::builder()
            .default_distribution(ReturnDistribution::LogNormal {
                drift: f64::NAN,
                volatility: 0.01,
            })
            .build()
            .is_err());
    }

    #[test]
    fn test_forecast_shapes() {
        let config = EngineConfig::builder().workers(3).seed(1).build().unwrap();
        let forecaster = PortfolioForecaster::new(config).unwrap();

        let result = forecaster
            .forecast(&request(100), &forecaster.default_market())
            .unwrap();

        assert_eq!(result.trajectories().len(), DEFAULT_DISPLAY_LIMIT);
        assert_eq!(result.sequential().summary().count, 100);
        assert_eq!(result.parallel().summary().count, 100);
        assert_eq!(result.parallel().workers(), 3);
        assert_eq!(result.sequential().workers(), 1);
    }

    #[test]
    fn test_seeded_forecasters_reproduce() {
        let build = || {
            let config = EngineConfig::builder().workers(2).seed(99).build().unwrap();
            PortfolioForecaster::new(config).unwrap()
        };
        let a = build();
        let b = build();

        let ra = a.forecast(&request(50), &a.default_market()).unwrap();
        let rb = b.forecast(&request(50), &b.default_market()).unwrap();

        assert_eq!(ra.sequential_mean(), rb.sequential_mean());
        assert_eq!(ra.parallel_mean(), rb.parallel_mean());
        assert_eq!(ra.trajectories(), rb.trajectories());
    }

    #[test]
    fn test_invalid_market_runs_nothing() {
        let config = EngineConfig::builder().workers(2).seed(3).build().unwrap();
        let forecaster = PortfolioForecaster::new(config).unwrap();
        let mut market = MarketModel::default();
        market.insert(
            "AAPL",
            ReturnDistribution::Uniform {
                min: -2.0,
                max: 0.1,
            },
        );

        assert!(forecaster.forecast(&request(10), &market).is_err());
        assert_eq!(forecaster.seeds().issued(), 0);
    }
}
