//! Multi-worker runner.
//!
//! # Scheme
//!
//! ```text
//! [0, n) ──partition──▶ W contiguous ranges
//!    │                       │
//!    │   seeds.next_seeds(W) ┘   (one seed per worker, drawn up front)
//!    ▼
//! worker i: TrialRng::from_seed(seed_i) ─▶ TrialKernel::run_trials(len_i) ─▶ private batch
//!    │
//!    ▼  (join: rayon collect blocks until every worker returns)
//! TrialBatch::concat(batches)
//! ```
//!
//! Workers share only the immutable [`TrialKernel`]. No generator, counter or
//! output collection is shared while trials run, so no locking is needed.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use super::batch::TrialBatch;
use super::partition::{effective_workers, partition_trials};
use super::runner::SimulationRunner;
use super::trial::TrialKernel;
use crate::error::{EngineError, Result};
use crate::model::{MarketModel, SimulationRequest};
use crate::rng::{SeedSource, TrialRng};

/// Upper bound on configured worker threads.
pub const MAX_WORKERS: usize = 1024;

/// Runs trials on a dedicated pool of worker threads.
///
/// The pool is built once and reused across requests; each run uses
/// `min(pool size, num_simulations)` workers.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::mc::{ParallelRunner, SimulationRunner};
/// use forecast_engine::model::{MarketModel, PortfolioAllocation, SimulationRequest};
/// use forecast_engine::rng::SeedSource;
///
/// let runner = ParallelRunner::new(4).unwrap();
/// let allocation = PortfolioAllocation::new([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
/// let request = SimulationRequest::new(10_000.0, allocation, 30, 1_000).unwrap();
///
/// let batch = runner
///     .run(&request, &MarketModel::default(), &SeedSource::new(42))
///     .unwrap();
/// assert_eq!(batch.len(), 1_000);
/// ```
#[derive(Clone, Debug)]
pub struct ParallelRunner {
    pool: Arc<ThreadPool>,
}

impl ParallelRunner {
    /// Builds a runner with its own pool of `workers` threads.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `workers` is zero or above [`MAX_WORKERS`];
    /// `ThreadPool` if the threads cannot be spawned.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 || workers > MAX_WORKERS {
            return Err(EngineError::invalid(
                "workers",
                format!("must be in range [1, {}], got {}", MAX_WORKERS, workers),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("forecast-worker-{}", idx))
            .build()?;
        Ok(Self::with_pool(Arc::new(pool)))
    }

    /// Builds a runner sized to the machine's logical CPUs.
    pub fn with_available_parallelism() -> Result<Self> {
        Self::new(num_cpus::get().clamp(1, MAX_WORKERS))
    }

    /// Wraps an existing pool.
    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool }
    }

    /// Number of threads in the pool.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl SimulationRunner for ParallelRunner {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn workers_for(&self, n_trials: usize) -> usize {
        effective_workers(self.pool_size(), n_trials)
    }

    fn run(
        &self,
        request: &SimulationRequest,
        market: &MarketModel,
        seeds: &SeedSource,
    ) -> Result<TrialBatch> {
        let kernel = TrialKernel::new(request, market)?;
        let ranges = partition_trials(request.num_simulations(), self.pool_size());
        let worker_seeds = seeds.next_seeds(ranges.len());

        debug!(
            workers = ranges.len(),
            trials = request.num_simulations(),
            days = request.days_to_predict(),
            "parallel run started"
        );

        let kernel = &kernel;
        let batches = self.pool.install(|| {
            ranges
                .into_par_iter()
                .zip(worker_seeds)
                .enumerate()
                .map(|(worker, (range, seed))| {
                    isolate(worker, || run_worker(kernel, worker, range, seed))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        Ok(TrialBatch::concat(batches))
    }
}

fn run_worker(
    kernel: &TrialKernel<'_>,
    worker: usize,
    range: Range<usize>,
    seed: u64,
) -> Result<TrialBatch> {
    let mut rng = TrialRng::from_seed(seed);
    let batch = kernel.run_trials(range.len(), &mut rng)?;
    debug!(
        worker,
        seed,
        first_trial = range.start,
        trials = batch.len(),
        "worker finished"
    );
    Ok(batch)
}

/// Runs one worker body, turning a panic into `WorkerFailed`.
fn isolate<F>(worker: usize, body: F) -> Result<TrialBatch>
where
    F: FnOnce() -> Result<TrialBatch>,
{
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        Err(EngineError::WorkerFailed {
            worker,
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PortfolioAllocation;

    fn request(days: usize, n: usize) -> SimulationRequest {
        let allocation = PortfolioAllocation::new([("A", 60.0), ("B", 40.0)]).unwrap();
        SimulationRequest::new(10_000.0, allocation, days, n).unwrap()
    }

    #[test]
    fn test_rejects_bad_worker_counts() {
        assert!(ParallelRunner::new(0).is_err());
        assert!(ParallelRunner::new(MAX_WORKERS + 1).is_err());
    }

    #[test]
    fn test_batch_shape() {
        let runner = ParallelRunner::new(4).unwrap();
        let request = request(15, 1_003);
        let batch = runner
            .run(&request, &MarketModel::default(), &SeedSource::new(5))
            .unwrap();

        assert_eq!(batch.len(), 1_003);
        assert!(batch
            .trajectories()
            .iter()
            .all(|t| t.len() == 16 && t[0] == 10_000.0));
    }

    #[test]
    fn test_fewer_trials_than_workers() {
        let runner = ParallelRunner::new(8).unwrap();
        let request = request(3, 3);
        let seeds = SeedSource::new(1);

        let batch = runner.run(&request, &MarketModel::default(), &seeds).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(seeds.issued(), 3);
        assert_eq!(runner.workers_for(3), 3);
    }

    #[test]
    fn test_workers_draw_independent_streams() {
        let runner = ParallelRunner::new(4).unwrap();
        let request = request(5, 400);
        let batch = runner
            .run(&request, &MarketModel::default(), &SeedSource::new(11))
            .unwrap();

        let mut finals: Vec<f64> = batch.final_values().collect();
        finals.sort_by(f64::total_cmp);
        finals.dedup();
        assert_eq!(finals.len(), 400);
    }

    #[test]
    fn test_panicking_worker_becomes_error() {
        let result = isolate(2, || panic!("trial exploded"));
        assert_eq!(
            result.unwrap_err(),
            EngineError::WorkerFailed {
                worker: 2,
                message: "trial exploded".to_string(),
            }
        );

        let formatted = isolate(0, || panic!("code {}", 7));
        assert!(matches!(
            formatted,
            Err(EngineError::WorkerFailed { message, .. }) if message == "code 7"
        ));
    }

    #[test]
    fn test_worker_error_propagates_unchanged() {
        let result = isolate(1, || Err(EngineError::EmptyBatch));
        assert_eq!(result.unwrap_err(), EngineError::EmptyBatch);
    }
}
