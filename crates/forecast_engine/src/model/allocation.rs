//! Portfolio allocation: ticker to percentage weight.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{EngineError, Result};

/// Largest accepted raw weight (percent of capital).
pub const MAX_WEIGHT: f64 = 100.0;

/// One allocated stock.
#[derive(Clone, Debug, PartialEq)]
pub struct Holding {
    ticker: String,
    weight: f64,
    fraction: f64,
}

impl Holding {
    /// Ticker symbol.
    #[inline]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Raw weight as supplied, in percent.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Weight normalised by the total allocated weight.
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

/// Immutable, validated portfolio allocation.
///
/// Holdings are kept in ticker order so iteration (and therefore path
/// generation and valuation) is deterministic. Raw weights are normalised to
/// fractions of the total weight at construction; they need not sum to 100.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::model::PortfolioAllocation;
///
/// let allocation = PortfolioAllocation::new([("MSFT", 20.0), ("AAPL", 30.0)]).unwrap();
/// let tickers: Vec<&str> = allocation.tickers().collect();
/// assert_eq!(tickers, ["AAPL", "MSFT"]);
/// assert!((allocation.holdings()[0].fraction() - 0.6).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioAllocation {
    holdings: Vec<Holding>,
    total_weight: f64,
}

impl PortfolioAllocation {
    /// Builds an allocation from `(ticker, weight)` pairs.
    ///
    /// Tickers are trimmed.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the allocation is empty, a ticker is blank or
    /// repeated, or a weight is outside `(0, 100]`.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut weights = BTreeMap::new();
        for (ticker, weight) in entries {
            let ticker = ticker.as_ref().trim();
            if ticker.is_empty() {
                return Err(EngineError::invalid("ticker", "must not be empty"));
            }
            if !weight.is_finite() || weight <= 0.0 || weight > MAX_WEIGHT {
                return Err(EngineError::invalid(
                    "weight",
                    format!("weight for {} must be in (0, 100], got {}", ticker, weight),
                ));
            }
            if weights.insert(ticker.to_string(), weight).is_some() {
                return Err(EngineError::invalid(
                    "ticker",
                    format!("duplicate ticker {}", ticker),
                ));
            }
        }

        if weights.is_empty() {
            return Err(EngineError::invalid(
                "allocation",
                "must contain at least one ticker",
            ));
        }

        let total_weight: f64 = weights.values().sum();
        let holdings = weights
            .into_iter()
            .map(|(ticker, weight)| Holding {
                ticker,
                weight,
                fraction: weight / total_weight,
            })
            .collect();

        Ok(Self {
            holdings,
            total_weight,
        })
    }

    /// Holdings in ticker order.
    #[inline]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Ticker symbols in order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> + '_ {
        self.holdings.iter().map(Holding::ticker)
    }

    /// Number of holdings.
    #[inline]
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Always `false`; construction rejects empty allocations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Sum of raw weights.
    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Returns the holding for a ticker.
    pub fn holding(&self, ticker: &str) -> Option<&Holding> {
        self.holdings
            .binary_search_by(|h| h.ticker.as_str().cmp(ticker))
            .ok()
            .map(|idx| &self.holdings[idx])
    }

    /// Raw weights keyed by ticker.
    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.holdings
            .iter()
            .map(|h| (h.ticker.clone(), h.weight))
            .collect()
    }
}

impl fmt::Display for PortfolioAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, holding) in self.holdings.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", holding.ticker, holding.weight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalises_weights() {
        let allocation = PortfolioAllocation::new([("A", 30.0), ("B", 10.0)]).unwrap();
        assert_relative_eq!(allocation.total_weight(), 40.0);
        assert_relative_eq!(allocation.holding("A").unwrap().fraction(), 0.75);
        assert_relative_eq!(allocation.holding("B").unwrap().fraction(), 0.25);

        let sum: f64 = allocation.holdings().iter().map(Holding::fraction).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_empty() {
        let entries: Vec<(&str, f64)> = vec![];
        let err = PortfolioAllocation::new(entries).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter {
                name: "allocation",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_weights() {
        for weight in [0.0, -5.0, 100.5, f64::NAN, f64::INFINITY] {
            assert!(
                PortfolioAllocation::new([("A", weight)]).is_err(),
                "weight {} should be rejected",
                weight
            );
        }
        assert!(PortfolioAllocation::new([("A", 100.0)]).is_ok());
    }

    #[test]
    fn test_rejects_blank_and_duplicate_tickers() {
        assert!(PortfolioAllocation::new([("  ", 10.0)]).is_err());
        assert!(PortfolioAllocation::new([("A", 10.0), (" A ", 20.0)]).is_err());
    }

    #[test]
    fn test_display_and_lookup() {
        let allocation = PortfolioAllocation::new([("MSFT", 40.0), ("AAPL", 60.0)]).unwrap();
        assert_eq!(allocation.to_string(), "AAPL=60, MSFT=40");
        assert!(allocation.holding("GOOG").is_none());
        assert_eq!(allocation.weights().len(), 2);
        assert!(!allocation.is_empty());
    }
}
