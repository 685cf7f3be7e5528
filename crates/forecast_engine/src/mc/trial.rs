//! Trial logic shared by both runners.

use super::batch::TrialBatch;
use super::paths::PricePath;
use super::valuation::value_portfolio;
use crate::error::Result;
use crate::model::{MarketModel, ReturnDistribution, SimulationRequest};
use crate::rng::RandomSource;

/// Everything a trial needs, resolved once per run.
///
/// The kernel is immutable and `Sync`; the parallel runner shares one
/// instance by reference across its workers while each worker brings its own
/// random source.
#[derive(Debug)]
pub struct TrialKernel<'a> {
    request: &'a SimulationRequest,
    distributions: Vec<ReturnDistribution>,
}

impl<'a> TrialKernel<'a> {
    /// Validates the inputs and resolves one distribution per holding.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the request or market model is invalid.
    pub fn new(request: &'a SimulationRequest, market: &MarketModel) -> Result<Self> {
        request.validate()?;
        market.validate()?;
        Ok(Self {
            request,
            distributions: market.resolve(request.allocation()),
        })
    }

    /// The request being simulated.
    #[inline]
    pub fn request(&self) -> &'a SimulationRequest {
        self.request
    }

    /// Distributions in allocation order.
    #[inline]
    pub fn distributions(&self) -> &[ReturnDistribution] {
        &self.distributions
    }

    /// Runs `count` trials drawing from `rng`.
    ///
    /// Per trial: one fresh path per stock, then one valuation. Path buffers
    /// are reused across trials.
    pub fn run_trials<R: RandomSource + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<TrialBatch> {
        let allocation = self.request.allocation();
        let capital = self.request.initial_capital();
        let days = self.request.days_to_predict();

        let mut batch = TrialBatch::with_capacity(count);
        if count == 0 {
            return Ok(batch);
        }

        let mut paths = allocation
            .tickers()
            .zip(&self.distributions)
            .map(|(ticker, dist)| PricePath::generate(ticker, dist, days, &mut *rng))
            .collect::<Result<Vec<_>>>()?;
        batch.push(value_portfolio(capital, allocation, &paths)?);

        for _ in 1..count {
            for (path, dist) in paths.iter_mut().zip(&self.distributions) {
                path.resample(dist, rng);
            }
            batch.push(value_portfolio(capital, allocation, &paths)?);
        }

        Ok(batch)
    }
}
