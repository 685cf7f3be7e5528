//! Assembly of the response handed to the display layer.

use crate::mc::Trajectory;
use crate::timing::{RunStatistics, TimedRun};

/// Default number of trajectories returned for charting.
pub const DEFAULT_DISPLAY_LIMIT: usize = 30;

/// Sequential versus parallel timing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PerformanceComparison {
    /// `sequential / parallel` time; `None` if the parallel run took no
    /// measurable time.
    pub speedup: Option<f64>,
    /// `(sequential - parallel) / sequential × 100`; 0 if the sequential
    /// run took no measurable time.
    pub improvement_pct: f64,
}

impl PerformanceComparison {
    /// Compares two runs.
    pub fn between(sequential: &RunStatistics, parallel: &RunStatistics) -> Self {
        let seq = sequential.execution_time_ms();
        let par = parallel.execution_time_ms();
        Self {
            speedup: (par > 0.0).then(|| seq / par),
            improvement_pct: if seq > 0.0 {
                (seq - par) / seq * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Outcome of one forecasting request.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationResult {
    sequential: RunStatistics,
    parallel: RunStatistics,
    comparison: PerformanceComparison,
    trajectories: Vec<Trajectory>,
}

impl SimulationResult {
    /// Statistics of the sequential run.
    #[inline]
    pub fn sequential(&self) -> &RunStatistics {
        &self.sequential
    }

    /// Statistics of the parallel run.
    #[inline]
    pub fn parallel(&self) -> &RunStatistics {
        &self.parallel
    }

    /// Mean final value of the sequential run.
    pub fn sequential_mean(&self) -> f64 {
        self.sequential.mean()
    }

    /// Sample standard deviation of the sequential run.
    pub fn sequential_std_dev(&self) -> f64 {
        self.sequential.std_dev()
    }

    /// Sequential execution time in milliseconds.
    pub fn sequential_execution_time_ms(&self) -> f64 {
        self.sequential.execution_time_ms()
    }

    /// Mean final value of the parallel run.
    pub fn parallel_mean(&self) -> f64 {
        self.parallel.mean()
    }

    /// Sample standard deviation of the parallel run.
    pub fn parallel_std_dev(&self) -> f64 {
        self.parallel.std_dev()
    }

    /// Parallel execution time in milliseconds.
    pub fn parallel_execution_time_ms(&self) -> f64 {
        self.parallel.execution_time_ms()
    }

    /// Timing comparison.
    #[inline]
    pub fn comparison(&self) -> &PerformanceComparison {
        &self.comparison
    }

    /// Trajectories selected for display.
    #[inline]
    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }
}

/// Builds [`SimulationResult`]s; selection and copying only.
///
/// Display trajectories are the first `display_limit` of the sequential
/// batch, whose order is fixed for a given seed.
#[derive(Clone, Copy, Debug)]
pub struct ResultAssembler {
    display_limit: usize,
}

impl Default for ResultAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_LIMIT)
    }
}

impl ResultAssembler {
    /// Creates an assembler keeping at most `display_limit` trajectories.
    pub fn new(display_limit: usize) -> Self {
        Self { display_limit }
    }

    /// Display limit.
    #[inline]
    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// Combines both runs into a result.
    pub fn assemble(&self, sequential: TimedRun, parallel: TimedRun) -> SimulationResult {
        let trajectories: Vec<Trajectory> = sequential
            .batch
            .into_trajectories()
            .into_iter()
            .take(self.display_limit)
            .collect();

        SimulationResult {
            comparison: PerformanceComparison::between(&sequential.statistics, &parallel.statistics),
            sequential: sequential.statistics,
            parallel: parallel.statistics,
            trajectories,
        }
    }
}

/// Flat wire shape of a [`SimulationResult`], using the field names the web
/// client reads. Execution times are in milliseconds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SimulationResponse {
    /// Sequential mean final value.
    pub sequential_mean: f64,
    /// Sequential sample standard deviation.
    pub sequential_std_dev: f64,
    /// Sequential execution time, ms.
    pub sequential_execution_time: f64,
    /// Parallel mean final value.
    pub parallel_mean: f64,
    /// Parallel sample standard deviation.
    pub parallel_std_dev: f64,
    /// Parallel execution time, ms.
    pub parallel_execution_time: f64,
    /// Workers used by the parallel run.
    pub parallel_workers: usize,
    /// Timing comparison.
    pub comparison: PerformanceComparison,
    /// Display trajectories.
    pub all_simulations: Vec<Vec<f64>>,
}

impl From<&SimulationResult> for SimulationResponse {
    fn from(result: &SimulationResult) -> Self {
        Self {
            sequential_mean: result.sequential_mean(),
            sequential_std_dev: result.sequential_std_dev(),
            sequential_execution_time: result.sequential_execution_time_ms(),
            parallel_mean: result.parallel_mean(),
            parallel_std_dev: result.parallel_std_dev(),
            parallel_execution_time: result.parallel_execution_time_ms(),
            parallel_workers: result.parallel().workers(),
            comparison: *result.comparison(),
            all_simulations: result
                .trajectories()
                .iter()
                .map(|t| t.values().to_vec())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::TrialBatch;
    use crate::stats::summarize;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn run(finals: &[f64], millis: u64, workers: usize) -> TimedRun {
        let batch: TrialBatch = finals
            .iter()
            .map(|&v| Trajectory::new(vec![100.0, v]))
            .collect();
        let summary = summarize(&batch).unwrap();
        TimedRun {
            statistics: RunStatistics::new(summary, Duration::from_millis(millis), workers),
            batch,
        }
    }

    #[test]
    fn test_assemble_caps_trajectories() {
        let finals: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = ResultAssembler::new(30).assemble(run(&finals, 40, 1), run(&finals, 10, 4));

        assert_eq!(result.trajectories().len(), 30);
        assert_eq!(result.trajectories()[0].final_value(), Some(100.0));
        assert_relative_eq!(result.sequential_execution_time_ms(), 40.0);
        assert_relative_eq!(result.parallel_execution_time_ms(), 10.0);
        assert_eq!(result.comparison().speedup, Some(4.0));
        assert_relative_eq!(result.comparison().improvement_pct, 75.0);
    }

    #[test]
    fn test_assemble_small_batch_keeps_all() {
        let result = ResultAssembler::default().assemble(run(&[1.0, 2.0], 1, 1), run(&[3.0], 1, 1));
        assert_eq!(result.trajectories().len(), 2);
        assert_relative_eq!(result.sequential_mean(), 1.5);
        assert_relative_eq!(result.parallel_mean(), 3.0);
    }

    #[test]
    fn test_zero_display_limit() {
        let result = ResultAssembler::new(0).assemble(run(&[1.0], 1, 1), run(&[1.0], 1, 1));
        assert!(result.trajectories().is_empty());
    }

    #[test]
    fn test_comparison_with_zero_durations() {
        let seq = run(&[1.0], 0, 1).statistics;
        let par = run(&[1.0], 0, 2).statistics;
        let cmp = PerformanceComparison::between(&seq, &par);
        assert_eq!(cmp.speedup, None);
        assert_eq!(cmp.improvement_pct, 0.0);
    }

    #[test]
    fn test_response_mirrors_result() {
        let result = ResultAssembler::new(5).assemble(run(&[10.0, 20.0], 8, 1), run(&[30.0], 2, 2));
        let response = SimulationResponse::from(&result);

        assert_relative_eq!(response.sequential_mean, 15.0);
        assert_relative_eq!(response.parallel_mean, 30.0);
        assert_relative_eq!(response.sequential_execution_time, 8.0);
        assert_eq!(response.parallel_workers, 2);
        assert_eq!(response.all_simulations, vec![vec![100.0, 10.0], vec![100.0, 20.0]]);
    }
}
