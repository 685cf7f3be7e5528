//! # Forecast Engine
//!
//! Monte Carlo forecasting of a buy-and-hold stock portfolio.
//!
//! Each trial draws a daily return path per stock, compounds each position
//! independently from its initial allocation and records the portfolio value
//! for every day of the horizon. The same request is run twice:
//!
//! - by [`mc::SequentialRunner`], one generator on the caller's thread
//! - by [`mc::ParallelRunner`], trials partitioned over a rayon pool with one
//!   independently seeded generator per worker
//!
//! Both runs are summarised (mean and sample standard deviation of final
//! values), timed, and combined into a [`SimulationResult`] alongside a
//! bounded set of trajectories for display.
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_engine::{EngineConfig, PortfolioAllocation, PortfolioForecaster, SimulationRequest};
//!
//! let forecaster = PortfolioForecaster::new(
//!     EngineConfig::builder().workers(4).seed(42).build().unwrap(),
//! )
//! .unwrap();
//!
//! let allocation = PortfolioAllocation::new([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
//! let request = SimulationRequest::new(10_000.0, allocation, 30, 1_000).unwrap();
//! let result = forecaster.forecast(&request, &forecaster.default_market()).unwrap();
//!
//! let gap = (result.sequential_mean() - result.parallel_mean()).abs();
//! assert!(gap < 0.05 * result.sequential_mean());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for requests, models and results

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod engine;
pub mod error;
pub mod mc;
pub mod model;
pub mod result;
pub mod rng;
pub mod stats;
pub mod timing;

pub use engine::{EngineConfig, EngineConfigBuilder, PortfolioForecaster};
pub use error::{EngineError, Result};
pub use model::{MarketModel, PortfolioAllocation, ReturnDistribution, SimulationRequest};
pub use result::{PerformanceComparison, ResultAssembler, SimulationResponse, SimulationResult};
pub use stats::Summary;
