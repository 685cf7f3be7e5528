//! Execution strategy seam.

use super::batch::TrialBatch;
use crate::error::Result;
use crate::model::{MarketModel, SimulationRequest};
use crate::rng::SeedSource;

/// One strategy for executing all trials of a request.
///
/// Implementations must produce exactly `request.num_simulations()`
/// trajectories drawn from the distributions in `market`; they may differ
/// only in how the work is scheduled. Seeds come from `seeds`, never from a
/// shared generator.
pub trait SimulationRunner: Send + Sync {
    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    /// Number of workers this runner would use for `n_trials`.
    fn workers_for(&self, n_trials: usize) -> usize;

    /// Executes every trial and returns the resulting batch.
    fn run(
        &self,
        request: &SimulationRequest,
        market: &MarketModel,
        seeds: &SeedSource,
    ) -> Result<TrialBatch>;
}
