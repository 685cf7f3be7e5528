//! # Random Number Generation Infrastructure
//!
//! Random sources for the simulation runners.
//!
//! ## Design
//!
//! - **Reproducibility**: every [`TrialRng`] is built from a 64-bit seed
//! - **Ownership**: each runner, and each parallel worker, constructs and
//!   owns its own generator; generators are never shared between threads
//! - **Seed distribution**: [`SeedSource`] is the only shared state. It hands
//!   out well-mixed, distinct seeds from an atomic counter before any worker
//!   starts drawing
//! - **Static dispatch**: path generation is generic over [`RandomSource`], so
//!   tests can substitute a scripted source without boxing in the hot loop
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_engine::rng::{RandomSource, SeedSource, TrialRng};
//!
//! let seeds = SeedSource::new(42);
//! let mut rng = TrialRng::from_seed(seeds.next_seed());
//!
//! let u = rng.uniform();
//! let z = rng.standard_normal();
//! assert!((0.0..1.0).contains(&u));
//! assert!(z.is_finite());
//! ```

mod prng;
mod seed;

pub use prng::TrialRng;
pub use seed::SeedSource;

/// A source of the two primitive variates the return models consume.
///
/// Implemented by [`TrialRng`]; tests implement it with fixed scripts to make
/// valuations exactly predictable.
pub trait RandomSource {
    /// Draws a uniform value in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Draws a standard normal variate (mean 0, variance 1).
    fn standard_normal(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    #[inline]
    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }
}
