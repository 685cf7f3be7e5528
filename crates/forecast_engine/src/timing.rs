//! Wall-clock instrumentation of runners.
//!
//! The timed window covers path generation, valuation and aggregation of a
//! single runner. Request validation happens before the window opens and
//! result formatting after it closes.

use std::time::{Duration, Instant};

use tracing::info;

use crate::error::Result;
use crate::mc::{SimulationRunner, TrialBatch};
use crate::model::{MarketModel, SimulationRequest};
use crate::rng::SeedSource;
use crate::stats::{summarize, Summary};

/// Converts a duration to fractional milliseconds.
#[inline]
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

/// Runs `f` and measures how long it took.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::timing::timed;
///
/// let (value, elapsed) = timed(|| (1..=10).sum::<u32>());
/// assert_eq!(value, 55);
/// assert!(elapsed.as_secs() < 1);
/// ```
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

/// Aggregate statistics of one runner plus its execution time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunStatistics {
    summary: Summary,
    elapsed: Duration,
    workers: usize,
}

impl RunStatistics {
    /// Bundles a summary with its measured duration.
    pub fn new(summary: Summary, elapsed: Duration, workers: usize) -> Self {
        Self {
            summary,
            elapsed,
            workers,
        }
    }

    /// Mean final value.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.summary.mean
    }

    /// Sample standard deviation of final values.
    #[inline]
    pub fn std_dev(&self) -> f64 {
        self.summary.std_dev
    }

    /// Full distribution summary.
    #[inline]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Measured wall-clock duration.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Measured wall-clock duration in milliseconds.
    #[inline]
    pub fn execution_time_ms(&self) -> f64 {
        duration_ms(self.elapsed)
    }

    /// Workers the run was spread over.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Output of a timed run.
#[derive(Clone, Debug)]
pub struct TimedRun {
    /// All trajectories of the run.
    pub batch: TrialBatch,
    /// Statistics and timing.
    pub statistics: RunStatistics,
}

/// Executes `runner` end to end and times it, aggregation included.
///
/// # Errors
///
/// Whatever the runner or the aggregator returns.
pub fn time_runner<R: SimulationRunner + ?Sized>(
    runner: &R,
    request: &SimulationRequest,
    market: &MarketModel,
    seeds: &SeedSource,
) -> Result<TimedRun> {
    let workers = runner.workers_for(request.num_simulations());

    let (outcome, elapsed) = timed(|| -> Result<(TrialBatch, Summary)> {
        let batch = runner.run(request, market, seeds)?;
        let summary = summarize(&batch)?;
        Ok((batch, summary))
    });
    let (batch, summary) = outcome?;

    let statistics = RunStatistics::new(summary, elapsed, workers);
    info!(
        runner = runner.name(),
        workers,
        trials = batch.len(),
        mean = statistics.mean(),
        std_dev = statistics.std_dev(),
        elapsed_ms = statistics.execution_time_ms(),
        "run completed"
    );

    Ok(TimedRun { batch, statistics })
}
