//! Single-threaded runner.

use tracing::debug;

use super::batch::TrialBatch;
use super::runner::SimulationRunner;
use super::trial::TrialKernel;
use crate::error::Result;
use crate::model::{MarketModel, SimulationRequest};
use crate::rng::{SeedSource, TrialRng};

/// Runs every trial one after another on the calling thread.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::mc::{SequentialRunner, SimulationRunner};
/// use forecast_engine::model::{MarketModel, PortfolioAllocation, SimulationRequest};
/// use forecast_engine::rng::SeedSource;
///
/// let allocation = PortfolioAllocation::new([("AAPL", 100.0)]).unwrap();
/// let request = SimulationRequest::new(1_000.0, allocation, 10, 100).unwrap();
///
/// let batch = SequentialRunner
///     .run(&request, &MarketModel::default(), &SeedSource::new(1))
///     .unwrap();
/// assert_eq!(batch.len(), 100);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialRunner;

impl SimulationRunner for SequentialRunner {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn workers_for(&self, n_trials: usize) -> usize {
        n_trials.min(1)
    }

    fn run(
        &self,
        request: &SimulationRequest,
        market: &MarketModel,
        seeds: &SeedSource,
    ) -> Result<TrialBatch> {
        let kernel = TrialKernel::new(request, market)?;
        let mut rng = TrialRng::from_seed(seeds.next_seed());

        debug!(
            seed = rng.seed(),
            trials = request.num_simulations(),
            days = request.days_to_predict(),
            "sequential run started"
        );
        kernel.run_trials(request.num_simulations(), &mut rng)
    }
}
