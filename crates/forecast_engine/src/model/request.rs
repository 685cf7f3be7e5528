//! Validated simulation request.

use std::collections::BTreeMap;

use super::allocation::PortfolioAllocation;
use crate::error::{EngineError, Result};

/// Maximum prediction horizon in days.
pub const MAX_DAYS: usize = 10_000;

/// Maximum number of simulation trials per runner.
pub const MAX_SIMULATIONS: usize = 10_000_000;

/// One forecasting request.
///
/// Constructed only through [`SimulationRequest::new`], which rejects every
/// invalid combination, so a request in hand is always runnable. Runners
/// borrow it read-only.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::model::{PortfolioAllocation, SimulationRequest};
///
/// let allocation = PortfolioAllocation::new([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
/// let request = SimulationRequest::new(10_000.0, allocation, 30, 1_000).unwrap();
/// assert_eq!(request.trajectory_len(), 31);
///
/// let allocation = PortfolioAllocation::new([("AAPL", 100.0)]).unwrap();
/// assert!(SimulationRequest::new(10_000.0, allocation, 0, 1_000).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawSimulationRequest", into = "RawSimulationRequest")
)]
pub struct SimulationRequest {
    initial_capital: f64,
    allocation: PortfolioAllocation,
    days_to_predict: usize,
    num_simulations: usize,
}

impl SimulationRequest {
    /// Creates a validated request.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if capital is not a positive finite number, or the
    /// day or trial count is zero or above its maximum.
    pub fn new(
        initial_capital: f64,
        allocation: PortfolioAllocation,
        days_to_predict: usize,
        num_simulations: usize,
    ) -> Result<Self> {
        let request = Self {
            initial_capital,
            allocation,
            days_to_predict,
            num_simulations,
        };
        request.validate()?;
        Ok(request)
    }

    /// Re-checks every field.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(EngineError::invalid(
                "initial_capital",
                format!("must be positive and finite, got {}", self.initial_capital),
            ));
        }
        if self.days_to_predict == 0 || self.days_to_predict > MAX_DAYS {
            return Err(EngineError::invalid(
                "days_to_predict",
                format!(
                    "must be in range [1, {}], got {}",
                    MAX_DAYS, self.days_to_predict
                ),
            ));
        }
        if self.num_simulations == 0 || self.num_simulations > MAX_SIMULATIONS {
            return Err(EngineError::invalid(
                "num_simulations",
                format!(
                    "must be in range [1, {}], got {}",
                    MAX_SIMULATIONS, self.num_simulations
                ),
            ));
        }
        if self.allocation.is_empty() {
            return Err(EngineError::invalid(
                "allocation",
                "must contain at least one ticker",
            ));
        }
        Ok(())
    }

    /// Capital invested on day 0.
    #[inline]
    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Portfolio allocation.
    #[inline]
    pub fn allocation(&self) -> &PortfolioAllocation {
        &self.allocation
    }

    /// Prediction horizon in days.
    #[inline]
    pub fn days_to_predict(&self) -> usize {
        self.days_to_predict
    }

    /// Number of trials each runner executes.
    #[inline]
    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }

    /// Length of every trajectory (`days_to_predict + 1`).
    #[inline]
    pub fn trajectory_len(&self) -> usize {
        self.days_to_predict + 1
    }
}

/// Wire shape of a request, with the field names the web client sends.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct RawSimulationRequest {
    /// Capital invested on day 0.
    pub initial_capital: f64,
    /// Ticker to percentage weight.
    pub stock_weights: BTreeMap<String, f64>,
    /// Prediction horizon in days.
    pub days_to_predict: usize,
    /// Number of trials.
    pub num_simulations: usize,
}

impl TryFrom<RawSimulationRequest> for SimulationRequest {
    type Error = EngineError;

    fn try_from(raw: RawSimulationRequest) -> Result<Self> {
        let allocation = PortfolioAllocation::new(raw.stock_weights)?;
        Self::new(
            raw.initial_capital,
            allocation,
            raw.days_to_predict,
            raw.num_simulations,
        )
    }
}

impl From<SimulationRequest> for RawSimulationRequest {
    fn from(request: SimulationRequest) -> Self {
        Self {
            initial_capital: request.initial_capital,
            stock_weights: request.allocation.weights(),
            days_to_predict: request.days_to_predict,
            num_simulations: request.num_simulations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation() -> PortfolioAllocation {
        PortfolioAllocation::new([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap()
    }

    #[test]
    fn test_valid_request() {
        let request = SimulationRequest::new(10_000.0, allocation(), 30, 100).unwrap();
        assert_eq!(request.initial_capital(), 10_000.0);
        assert_eq!(request.days_to_predict(), 30);
        assert_eq!(request.num_simulations(), 100);
        assert_eq!(request.allocation().len(), 2);
    }

    #[test]
    fn test_invalid_capital() {
        for capital in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = SimulationRequest::new(capital, allocation(), 30, 100).unwrap_err();
            assert!(matches!(
                err,
                EngineError::InvalidParameter {
                    name: "initial_capital",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_invalid_counts() {
        let err = SimulationRequest::new(1.0, allocation(), 0, 100).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter {
                name: "days_to_predict",
                ..
            }
        ));

        let err = SimulationRequest::new(1.0, allocation(), 10, 0).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter {
                name: "num_simulations",
                ..
            }
        ));

        assert!(SimulationRequest::new(1.0, allocation(), MAX_DAYS + 1, 1).is_err());
        assert!(SimulationRequest::new(1.0, allocation(), 1, MAX_SIMULATIONS + 1).is_err());
    }

    #[test]
    fn test_raw_conversion_round_trip() {
        let raw = RawSimulationRequest {
            initial_capital: 500.0,
            stock_weights: [("AAPL".to_string(), 50.0), ("GOOG".to_string(), 50.0)]
                .into_iter()
                .collect(),
            days_to_predict: 5,
            num_simulations: 10,
        };
        let request = SimulationRequest::try_from(raw).unwrap();
        let back: RawSimulationRequest = request.into();
        assert_eq!(back.stock_weights.len(), 2);
        assert_eq!(back.days_to_predict, 5);
    }

    #[test]
    fn test_raw_conversion_rejects_empty_weights() {
        let raw = RawSimulationRequest {
            initial_capital: 500.0,
            stock_weights: BTreeMap::new(),
            days_to_predict: 5,
            num_simulations: 10,
        };
        assert!(SimulationRequest::try_from(raw).is_err());
    }
}
