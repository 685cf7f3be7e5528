//! Trajectories and trial batches.

use std::ops::Index;

/// Portfolio value per day for one trial; index 0 is the initial capital.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Trajectory(Vec<f64>);

impl Trajectory {
    /// Wraps daily portfolio values.
    #[inline]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Daily values, day 0 first.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of points (`days + 1`).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the trajectory has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Day-0 value.
    #[inline]
    pub fn initial_value(&self) -> Option<f64> {
        self.0.first().copied()
    }

    /// Value at the prediction horizon.
    #[inline]
    pub fn final_value(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// Consumes the trajectory, returning its values.
    #[inline]
    pub fn into_values(self) -> Vec<f64> {
        self.0
    }
}

impl Index<usize> for Trajectory {
    type Output = f64;

    #[inline]
    fn index(&self, day: usize) -> &f64 {
        &self.0[day]
    }
}

/// All trajectories produced by one runner, in no meaningful order.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::mc::{TrialBatch, Trajectory};
///
/// let mut left = TrialBatch::with_capacity(1);
/// left.push(Trajectory::new(vec![100.0, 110.0]));
/// let mut right = TrialBatch::default();
/// right.push(Trajectory::new(vec![100.0, 90.0]));
///
/// let merged = TrialBatch::concat(vec![left, right]);
/// assert_eq!(merged.final_values().collect::<Vec<_>>(), [110.0, 90.0]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrialBatch {
    trajectories: Vec<Trajectory>,
}

impl TrialBatch {
    /// Creates an empty batch with room for `capacity` trajectories.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trajectories: Vec::with_capacity(capacity),
        }
    }

    /// Appends one trajectory.
    #[inline]
    pub fn push(&mut self, trajectory: Trajectory) {
        self.trajectories.push(trajectory);
    }

    /// Joins partial batches into one. Called once, after every worker has
    /// finished.
    pub fn concat(parts: Vec<TrialBatch>) -> Self {
        let total = parts.iter().map(TrialBatch::len).sum();
        let mut merged = Self::with_capacity(total);
        for part in parts {
            merged.trajectories.extend(part.trajectories);
        }
        merged
    }

    /// Number of trajectories.
    #[inline]
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    /// Returns `true` if the batch has no trajectories.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Trajectories in insertion order.
    #[inline]
    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    /// Horizon value of every non-empty trajectory.
    pub fn final_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.trajectories.iter().filter_map(Trajectory::final_value)
    }

    /// Consumes the batch, returning its trajectories.
    #[inline]
    pub fn into_trajectories(self) -> Vec<Trajectory> {
        self.trajectories
    }
}

impl FromIterator<Trajectory> for TrialBatch {
    fn from_iter<I: IntoIterator<Item = Trajectory>>(iter: I) -> Self {
        Self {
            trajectories: iter.into_iter().collect(),
        }
    }
}
