//! Daily return distributions.
//!
//! A [`ReturnDistribution`] is the single source of randomness shape for a
//! stock. Both runners read the same instance, which is what makes their
//! outputs statistically equivalent.

use crate::error::{EngineError, Result};
use crate::rng::RandomSource;

/// Default daily log-return drift.
pub const DEFAULT_DAILY_DRIFT: f64 = 0.0003;

/// Default daily log-return volatility.
pub const DEFAULT_DAILY_VOLATILITY: f64 = 0.015;

/// Distribution of one stock's daily simple return.
///
/// # Models
///
/// - `LogNormal`: the daily log return is `N(drift, volatility²)`; the simple
///   return is `exp(x) - 1`, so prices can never go negative
/// - `Uniform`: the simple return is uniform on `[min, max)`, `min > -1`
///
/// # Examples
///
/// ```rust
/// use forecast_engine::model::ReturnDistribution;
/// use forecast_engine::rng::TrialRng;
///
/// let dist = ReturnDistribution::log_normal(0.0005, 0.02).unwrap();
/// let mut rng = TrialRng::from_seed(1);
/// let r = dist.sample(&mut rng);
/// assert!(r > -1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "model", rename_all = "snake_case"))]
pub enum ReturnDistribution {
    /// Gaussian daily log return.
    LogNormal {
        /// Mean of the daily log return.
        drift: f64,
        /// Standard deviation of the daily log return.
        volatility: f64,
    },
    /// Uniform daily simple return.
    Uniform {
        /// Lower bound (inclusive), greater than -1.
        min: f64,
        /// Upper bound (exclusive).
        max: f64,
    },
}

impl Default for ReturnDistribution {
    fn default() -> Self {
        Self::LogNormal {
            drift: DEFAULT_DAILY_DRIFT,
            volatility: DEFAULT_DAILY_VOLATILITY,
        }
    }
}

impl ReturnDistribution {
    /// Creates a validated log-normal model.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if either parameter is non-finite or the
    /// volatility is negative.
    pub fn log_normal(drift: f64, volatility: f64) -> Result<Self> {
        let dist = Self::LogNormal { drift, volatility };
        dist.validate()?;
        Ok(dist)
    }

    /// Creates a validated uniform model.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if a bound is non-finite, `min <= -1` or
    /// `min > max`.
    pub fn uniform(min: f64, max: f64) -> Result<Self> {
        let dist = Self::Uniform { min, max };
        dist.validate()?;
        Ok(dist)
    }

    /// Checks the parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::LogNormal { drift, volatility } => {
                if !drift.is_finite() {
                    return Err(EngineError::invalid(
                        "drift",
                        format!("must be finite, got {}", drift),
                    ));
                }
                if !volatility.is_finite() || volatility < 0.0 {
                    return Err(EngineError::invalid(
                        "volatility",
                        format!("must be finite and non-negative, got {}", volatility),
                    ));
                }
            }
            Self::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(EngineError::invalid(
                        "uniform_bounds",
                        format!("must be finite, got [{}, {})", min, max),
                    ));
                }
                if min <= -1.0 {
                    return Err(EngineError::invalid(
                        "uniform_bounds",
                        format!("lower bound must exceed -1, got {}", min),
                    ));
                }
                if min > max {
                    return Err(EngineError::invalid(
                        "uniform_bounds",
                        format!("lower bound {} exceeds upper bound {}", min, max),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Draws one daily simple return.
    #[inline]
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::LogNormal { drift, volatility } => {
                (drift + volatility * rng.standard_normal()).exp_m1()
            }
            Self::Uniform { min, max } => min + (max - min) * rng.uniform(),
        }
    }

    /// Expected one-day growth factor `E[1 + r]`.
    ///
    /// Since days are independent, a holding's expected value after `d` days
    /// is its allocated capital times this factor to the power `d`.
    pub fn expected_growth(&self) -> f64 {
        match *self {
            Self::LogNormal { drift, volatility } => {
                (drift + 0.5 * volatility * volatility).exp()
            }
            Self::Uniform { min, max } => 1.0 + 0.5 * (min + max),
        }
    }
}
