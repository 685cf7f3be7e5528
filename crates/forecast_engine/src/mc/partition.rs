//! Splitting the trial index range across workers.

use std::ops::Range;

/// Number of workers actually used for `n_trials` with `available` workers.
///
/// Never more workers than trials, never fewer than one (for `n_trials > 0`).
#[inline]
pub fn effective_workers(available: usize, n_trials: usize) -> usize {
    available.max(1).min(n_trials)
}

/// Splits `[0, n_trials)` into contiguous, near-equal sub-ranges.
///
/// The first `n_trials % w` ranges receive one extra trial, where `w` is
/// [`effective_workers`]. Every index is covered exactly once; zero trials
/// yield no ranges.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::mc::partition_trials;
///
/// assert_eq!(partition_trials(7, 4), vec![0..2, 2..4, 4..6, 6..7]);
/// assert_eq!(partition_trials(2, 8), vec![0..1, 1..2]);
/// ```
pub fn partition_trials(n_trials: usize, available: usize) -> Vec<Range<usize>> {
    let workers = effective_workers(available, n_trials);
    if workers == 0 {
        return Vec::new();
    }

    let base = n_trials / workers;
    let extra = n_trials % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for worker in 0..workers {
        let len = base + usize::from(worker < extra);
        ranges.push(start..start + len);
        start += len;
    }
    debug_assert_eq!(start, n_trials);
    ranges
}
