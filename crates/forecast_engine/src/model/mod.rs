//! Request and market data types.
//!
//! - [`PortfolioAllocation`]: validated ticker weights, normalised to fractions
//! - [`SimulationRequest`]: capital, allocation, horizon and trial count
//! - [`ReturnDistribution`]: daily return model of one stock
//! - [`MarketModel`]: ticker to return model lookup

mod allocation;
mod distribution;
mod market;
mod request;

pub use allocation::{Holding, PortfolioAllocation, MAX_WEIGHT};
pub use distribution::{ReturnDistribution, DEFAULT_DAILY_DRIFT, DEFAULT_DAILY_VOLATILITY};
pub use market::MarketModel;
pub use request::{RawSimulationRequest, SimulationRequest, MAX_DAYS, MAX_SIMULATIONS};
