//! Portfolio valuation under buy-and-hold.
//!
//! Each holding starts with `capital × fraction` on day 0 and compounds by
//! its own daily returns; the portfolio value on day `i` is the sum of the
//! compounded holdings:
//!
//! ```text
//! V(0) = C
//! V(i) = Σ_s C·w_s·Π_{k=1..i} (1 + r_{s,k})
//! ```
//!
//! There is no daily rebalancing: weights drift with performance.

use super::batch::Trajectory;
use super::paths::PricePath;
use crate::error::{EngineError, Result};
use crate::model::PortfolioAllocation;

/// Values the portfolio over the horizon of `paths`.
///
/// `paths` must contain exactly one path per allocated ticker, in the
/// allocation's ticker order, all of the same length.
///
/// # Errors
///
/// - `AllocationMismatch` if the path tickers differ from the allocation
/// - `InvalidParameter` if `paths` are empty or of unequal length
///
/// # Examples
///
/// ```rust
/// use forecast_engine::mc::{value_portfolio, PricePath};
/// use forecast_engine::model::PortfolioAllocation;
///
/// let allocation = PortfolioAllocation::new([("A", 50.0), ("B", 50.0)]).unwrap();
/// let paths = [
///     PricePath::new("A", vec![0.10]).unwrap(),
///     PricePath::new("B", vec![-0.10]).unwrap(),
/// ];
/// let trajectory = value_portfolio(1_000.0, &allocation, &paths).unwrap();
/// assert_eq!(trajectory.values(), &[1_000.0, 1_000.0]);
/// ```
pub fn value_portfolio(
    capital: f64,
    allocation: &PortfolioAllocation,
    paths: &[PricePath<'_>],
) -> Result<Trajectory> {
    check_paths(allocation, paths)?;

    let days = paths[0].days();
    let mut values = vec![0.0; days + 1];

    for (holding, path) in allocation.holdings().iter().zip(paths) {
        let mut position = capital * holding.fraction();
        for (value, &ret) in values[1..].iter_mut().zip(path.returns()) {
            position *= 1.0 + ret;
            *value += position;
        }
    }
    values[0] = capital;

    Ok(Trajectory::new(values))
}

fn check_paths(allocation: &PortfolioAllocation, paths: &[PricePath<'_>]) -> Result<()> {
    let matches = paths.len() == allocation.len()
        && allocation
            .tickers()
            .zip(paths)
            .all(|(ticker, path)| ticker == path.ticker());
    if !matches {
        return Err(EngineError::AllocationMismatch {
            expected: allocation.tickers().map(str::to_owned).collect(),
            found: paths.iter().map(|p| p.ticker().to_owned()).collect(),
        });
    }

    let days = paths[0].days();
    if days == 0 {
        return Err(EngineError::invalid(
            "days_to_predict",
            "price paths must cover at least one day",
        ));
    }
    if let Some(path) = paths.iter().find(|p| p.days() != days) {
        return Err(EngineError::invalid(
            "price_path",
            format!(
                "path for {} has {} days, expected {}",
                path.ticker(),
                path.days(),
                days
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_stock() -> PortfolioAllocation {
        PortfolioAllocation::new([("A", 60.0), ("B", 40.0)]).unwrap()
    }

    #[test]
    fn test_compounding_without_rebalancing() {
        let allocation = two_stock();
        let paths = [
            PricePath::new("A", vec![0.10, 0.10]).unwrap(),
            PricePath::new("B", vec![-0.50, 1.00]).unwrap(),
        ];
        let t = value_portfolio(1_000.0, &allocation, &paths).unwrap();

        assert_eq!(t.len(), 3);
        assert_eq!(t[0], 1_000.0);
        assert_relative_eq!(t[1], 600.0 * 1.1 + 400.0 * 0.5, epsilon = 1e-9);
        assert_relative_eq!(t[2], 600.0 * 1.21 + 400.0 * 0.5 * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_returns_keep_capital() {
        let allocation = two_stock();
        let paths = [
            PricePath::new("A", vec![0.0; 5]).unwrap(),
            PricePath::new("B", vec![0.0; 5]).unwrap(),
        ];
        let t = value_portfolio(250.0, &allocation, &paths).unwrap();
        for &v in t.values() {
            assert_relative_eq!(v, 250.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_mismatched_tickers() {
        let allocation = two_stock();
        let paths = [
            PricePath::new("A", vec![0.0]).unwrap(),
            PricePath::new("C", vec![0.0]).unwrap(),
        ];
        let err = value_portfolio(1.0, &allocation, &paths).unwrap_err();
        assert!(err.is_internal());
        assert!(matches!(err, EngineError::AllocationMismatch { .. }));

        let err = value_portfolio(1.0, &allocation, &paths[..1]).unwrap_err();
        assert!(matches!(err, EngineError::AllocationMismatch { .. }));

        let err = value_portfolio(1.0, &allocation, &[]).unwrap_err();
        assert!(matches!(err, EngineError::AllocationMismatch { .. }));
    }

    #[test]
    fn test_unequal_lengths() {
        let allocation = two_stock();
        let paths = [
            PricePath::new("A", vec![0.0, 0.0]).unwrap(),
            PricePath::new("B", vec![0.0]).unwrap(),
        ];
        let err = value_portfolio(1.0, &allocation, &paths).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter {
                name: "price_path",
                ..
            }
        ));
    }
}
