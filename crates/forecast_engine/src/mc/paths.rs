//! Daily return path generation.
//!
//! A [`PricePath`] holds one stock's simulated daily simple returns for a
//! single trial. Paths are regenerated in place between trials so the trial
//! loop allocates only the output trajectory.

use crate::error::{EngineError, Result};
use crate::model::ReturnDistribution;
use crate::rng::RandomSource;

/// Simulated daily returns of one stock for one trial.
///
/// The ticker is borrowed from the allocation that owns it.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::mc::PricePath;
/// use forecast_engine::model::ReturnDistribution;
/// use forecast_engine::rng::TrialRng;
///
/// let mut rng = TrialRng::from_seed(42);
/// let path = PricePath::generate("AAPL", &ReturnDistribution::default(), 30, &mut rng).unwrap();
/// assert_eq!(path.days(), 30);
/// assert!(path.returns().iter().all(|&r| r > -1.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PricePath<'a> {
    ticker: &'a str,
    returns: Vec<f64>,
}

impl<'a> PricePath<'a> {
    /// Wraps explicit returns.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `returns` is empty.
    pub fn new(ticker: &'a str, returns: Vec<f64>) -> Result<Self> {
        if returns.is_empty() {
            return Err(EngineError::invalid(
                "days_to_predict",
                "a price path needs at least one day",
            ));
        }
        Ok(Self { ticker, returns })
    }

    /// Draws `days` independent daily returns from `dist`.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `days` is zero.
    pub fn generate<R: RandomSource + ?Sized>(
        ticker: &'a str,
        dist: &ReturnDistribution,
        days: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if days == 0 {
            return Err(EngineError::invalid(
                "days_to_predict",
                "must be at least 1, got 0",
            ));
        }
        let mut path = Self {
            ticker,
            returns: vec![0.0; days],
        };
        path.resample(dist, rng);
        Ok(path)
    }

    /// Overwrites every return with a fresh draw, keeping the length.
    #[inline]
    pub fn resample<R: RandomSource + ?Sized>(&mut self, dist: &ReturnDistribution, rng: &mut R) {
        for value in self.returns.iter_mut() {
            *value = dist.sample(rng);
        }
    }

    /// Ticker this path belongs to.
    #[inline]
    pub fn ticker(&self) -> &'a str {
        self.ticker
    }

    /// Daily simple returns, day 1 first.
    #[inline]
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Number of simulated days.
    #[inline]
    pub fn days(&self) -> usize {
        self.returns.len()
    }
}
