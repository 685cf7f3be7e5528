//! Per-ticker return models.

use std::collections::BTreeMap;

use super::allocation::PortfolioAllocation;
use super::distribution::ReturnDistribution;
use crate::error::Result;

/// Return model lookup shared read-only by both runners.
///
/// Tickers without an explicit entry use the default distribution.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::model::{MarketModel, ReturnDistribution};
///
/// let calibrated = ReturnDistribution::log_normal(0.001, 0.03).unwrap();
/// let market = MarketModel::default().with_ticker("TSLA", calibrated);
///
/// assert_eq!(market.distribution_for("TSLA"), &calibrated);
/// assert_eq!(market.distribution_for("AAPL"), &ReturnDistribution::default());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketModel {
    default: ReturnDistribution,
    #[cfg_attr(feature = "serde", serde(default))]
    overrides: BTreeMap<String, ReturnDistribution>,
}

impl MarketModel {
    /// Creates a model where every ticker uses `default`.
    pub fn new(default: ReturnDistribution) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Adds or replaces the distribution of one ticker.
    pub fn with_ticker(mut self, ticker: impl Into<String>, dist: ReturnDistribution) -> Self {
        self.insert(ticker, dist);
        self
    }

    /// Adds or replaces the distribution of one ticker.
    pub fn insert(&mut self, ticker: impl Into<String>, dist: ReturnDistribution) {
        self.overrides.insert(ticker.into(), dist);
    }

    /// Default distribution.
    #[inline]
    pub fn default_distribution(&self) -> &ReturnDistribution {
        &self.default
    }

    /// Distribution used for `ticker`.
    pub fn distribution_for(&self, ticker: &str) -> &ReturnDistribution {
        self.overrides.get(ticker).unwrap_or(&self.default)
    }

    /// Returns `true` if `ticker` has its own distribution.
    pub fn is_calibrated(&self, ticker: &str) -> bool {
        self.overrides.contains_key(ticker)
    }

    /// Distributions for each holding, in allocation order.
    pub fn resolve(&self, allocation: &PortfolioAllocation) -> Vec<ReturnDistribution> {
        allocation
            .tickers()
            .map(|ticker| *self.distribution_for(ticker))
            .collect()
    }

    /// Validates the default and every override.
    pub fn validate(&self) -> Result<()> {
        self.default.validate()?;
        self.overrides.values().try_for_each(ReturnDistribution::validate)
    }

    /// Expected portfolio value after `days`, given day-0 `capital`.
    ///
    /// Used to check the simulated mean against theory.
    pub fn expected_value(
        &self,
        capital: f64,
        allocation: &PortfolioAllocation,
        days: usize,
    ) -> f64 {
        allocation
            .holdings()
            .iter()
            .map(|h| {
                let growth = self.distribution_for(h.ticker()).expected_growth();
                capital * h.fraction() * growth.powi(days as i32)
            })
            .sum()
    }
}
