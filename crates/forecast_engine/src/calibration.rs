//! Estimation of return models from historical closing prices.

use crate::error::{EngineError, Result};
use crate::model::ReturnDistribution;
use crate::stats::RunningStats;

/// Log-normal parameters estimated from a price series.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct HistoricalEstimate {
    /// Mean daily log return.
    pub drift: f64,
    /// Population standard deviation of daily log returns.
    pub volatility: f64,
    /// Number of returns the estimate is based on.
    pub observations: usize,
}

impl HistoricalEstimate {
    /// Converts the estimate into a validated return model.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if either parameter is non-finite.
    pub fn distribution(&self) -> Result<ReturnDistribution> {
        ReturnDistribution::log_normal(self.drift, self.volatility)
    }
}

/// Daily log returns `ln(p_t / p_{t-1})` of an ordered price series.
///
/// # Errors
///
/// `InvalidParameter` if fewer than two prices are given or any price is
/// non-positive or non-finite.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::calibration::log_returns;
///
/// let r = log_returns(&[100.0, 110.0, 99.0]).unwrap();
/// assert_eq!(r.len(), 2);
/// assert!((r[0] - (1.1_f64).ln()).abs() < 1e-12);
/// ```
pub fn log_returns(prices: &[f64]) -> Result<Vec<f64>> {
    if prices.len() < 2 {
        return Err(EngineError::invalid(
            "prices",
            format!("need at least 2 prices, got {}", prices.len()),
        ));
    }
    if let Some((idx, p)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(EngineError::invalid(
            "prices",
            format!("price at index {} must be positive, got {}", idx, p),
        ));
    }

    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Estimates drift and volatility from closing prices.
///
/// # Errors
///
/// See [`log_returns`].
pub fn estimate(prices: &[f64]) -> Result<HistoricalEstimate> {
    let returns = log_returns(prices)?;
    let stats: RunningStats = returns.iter().copied().collect();
    Ok(HistoricalEstimate {
        drift: stats.mean(),
        volatility: stats.population_std_dev(),
        observations: returns.len(),
    })
}

/// Calibrates a log-normal return model from closing prices.
///
/// # Errors
///
/// See [`log_returns`].
pub fn calibrate_log_normal(prices: &[f64]) -> Result<ReturnDistribution> {
    estimate(prices)?.distribution()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_growth_has_zero_volatility() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let est = estimate(&prices).unwrap();

        assert_eq!(est.observations, 9);
        assert_relative_eq!(est.drift, 1.01_f64.ln(), epsilon = 1e-12);
        assert!(est.volatility < 1e-10);
    }

    #[test]
    fn test_population_volatility() {
        // Returns alternate +ln2 / -ln2: mean 0, population std ln2.
        let est = estimate(&[100.0, 200.0, 100.0, 200.0, 100.0]).unwrap();
        assert_relative_eq!(est.drift, 0.0, epsilon = 1e-12);
        assert_relative_eq!(est.volatility, 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_calibrated_distribution() {
        let dist = calibrate_log_normal(&[100.0, 200.0, 100.0]).unwrap();
        match dist {
            ReturnDistribution::LogNormal { drift, volatility } => {
                assert_relative_eq!(drift, 0.0, epsilon = 1e-12);
                assert_relative_eq!(volatility, 2.0_f64.ln(), epsilon = 1e-12);
            }
            other => panic!("unexpected model {:?}", other),
        }
    }

    #[test]
    fn test_too_few_prices() {
        assert!(matches!(
            log_returns(&[100.0]),
            Err(EngineError::InvalidParameter { name: "prices", .. })
        ));
        assert!(log_returns(&[]).is_err());
    }

    #[test]
    fn test_non_positive_price() {
        assert!(log_returns(&[100.0, 0.0, 50.0]).is_err());
        assert!(log_returns(&[100.0, -1.0]).is_err());
        assert!(log_returns(&[100.0, f64::NAN]).is_err());
    }
}
