//! Aggregation of final portfolio values.
//!
//! [`RunningStats`] implements Welford's single-pass update, which avoids
//! the catastrophic cancellation of the naive `Σx² - n·mean²` formula, and
//! Chan et al.'s pairwise merge so partial accumulators can be combined.
//!
//! # Convention
//!
//! The reported standard deviation is the **sample** standard deviation
//! (divisor `n - 1`). A batch of one value has standard deviation 0. The
//! population figure (divisor `n`) is available as
//! [`Summary::population_std_dev`].

use crate::error::{EngineError, Result};
use crate::mc::TrialBatch;

/// Incremental mean/variance accumulator.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::stats::RunningStats;
///
/// let stats: RunningStats = [100.0, 200.0, 300.0].into_iter().collect();
/// assert_eq!(stats.mean(), 200.0);
/// assert_eq!(stats.sample_std_dev(), 100.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    /// Creates an empty accumulator.
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Adds one observation.
    #[inline]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Combines another accumulator into this one.
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;

        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean; 0 when empty.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance (divisor `n - 1`); 0 for fewer than two values.
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Population variance (divisor `n`); 0 when empty.
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Sample standard deviation.
    #[inline]
    pub fn sample_std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }

    /// Population standard deviation.
    #[inline]
    pub fn population_std_dev(&self) -> f64 {
        self.population_variance().sqrt()
    }

    /// Smallest observation, if any.
    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest observation, if any.
    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}

/// Distribution summary of one batch's final values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Summary {
    /// Number of values.
    pub count: u64,
    /// Mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Population standard deviation.
    pub population_std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl Summary {
    /// Standard error of the mean, `std_dev / √n`.
    pub fn std_error(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.std_dev / (self.count as f64).sqrt()
        }
    }
}

impl TryFrom<RunningStats> for Summary {
    type Error = EngineError;

    fn try_from(stats: RunningStats) -> Result<Self> {
        match (stats.min(), stats.max()) {
            (Some(min), Some(max)) => Ok(Self {
                count: stats.count(),
                mean: stats.mean(),
                std_dev: stats.sample_std_dev(),
                population_std_dev: stats.population_std_dev(),
                min,
                max,
            }),
            _ => Err(EngineError::EmptyBatch),
        }
    }
}

/// Summarises an arbitrary set of values.
///
/// # Errors
///
/// `EmptyBatch` if `values` is empty.
pub fn summarize_values<I: IntoIterator<Item = f64>>(values: I) -> Result<Summary> {
    values.into_iter().collect::<RunningStats>().try_into()
}

/// Summarises the final-day values of a batch.
///
/// # Errors
///
/// `EmptyBatch` if the batch holds no trajectories.
pub fn summarize(batch: &TrialBatch) -> Result<Summary> {
    if batch.is_empty() {
        return Err(EngineError::EmptyBatch);
    }
    summarize_values(batch.final_values())
}
