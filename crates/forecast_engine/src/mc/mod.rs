//! Monte Carlo simulation of portfolio trajectories.
//!
//! # Architecture
//!
//! ```text
//! SimulationRunner (trait)
//! ├── SequentialRunner   one TrialRng, trials in order on the caller's thread
//! └── ParallelRunner     W workers on a rayon pool, one TrialRng each
//!        └── partition_trials()   [0, n) → W contiguous ranges
//!
//! TrialKernel            shared, immutable trial logic
//! ├── PricePath::resample()      daily returns per stock
//! └── value_portfolio()          buy-and-hold compounding → Trajectory
//! ```
//!
//! Both runners go through [`TrialKernel`], so the path model, its
//! parameters and the valuation are identical; only scheduling differs.
//!
//! # Example
//!
//! ```rust
//! use forecast_engine::mc::{ParallelRunner, SequentialRunner, SimulationRunner};
//! use forecast_engine::model::{MarketModel, PortfolioAllocation, SimulationRequest};
//! use forecast_engine::rng::SeedSource;
//!
//! let allocation = PortfolioAllocation::new([("AAPL", 60.0), ("MSFT", 40.0)]).unwrap();
//! let request = SimulationRequest::new(10_000.0, allocation, 30, 2_000).unwrap();
//! let market = MarketModel::default();
//! let seeds = SeedSource::new(42);
//!
//! let sequential = SequentialRunner.run(&request, &market, &seeds).unwrap();
//! let parallel = ParallelRunner::new(4).unwrap().run(&request, &market, &seeds).unwrap();
//! assert_eq!(sequential.len(), parallel.len());
//! ```

mod batch;
mod parallel;
mod partition;
mod paths;
mod runner;
mod sequential;
mod trial;
mod valuation;

pub use batch::{Trajectory, TrialBatch};
pub use parallel::{ParallelRunner, MAX_WORKERS};
pub use partition::{effective_workers, partition_trials};
pub use paths::PricePath;
pub use runner::SimulationRunner;
pub use sequential::SequentialRunner;
pub use trial::TrialKernel;
pub use valuation::value_portfolio;
