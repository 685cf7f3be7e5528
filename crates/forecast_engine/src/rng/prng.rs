//! Seeded pseudo-random generator owned by a single runner or worker.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use super::RandomSource;

/// Per-worker random number generator.
///
/// Wraps `rand::rngs::StdRng` and samples normals with the Ziggurat method
/// via `rand_distr::StandardNormal`. The type is `Send` and never shared:
/// a worker builds one from its own seed and drops it when done.
///
/// # Examples
///
/// ```rust
/// use forecast_engine::rng::{RandomSource, TrialRng};
///
/// let mut a = TrialRng::from_seed(12345);
/// let mut b = TrialRng::from_seed(12345);
/// assert_eq!(a.standard_normal(), b.standard_normal());
/// assert_eq!(a.seed(), 12345);
/// ```
#[derive(Debug, Clone)]
pub struct TrialRng {
    inner: StdRng,
    seed: u64,
}

impl TrialRng {
    /// Creates a generator initialised with the given seed.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Returns the seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fills the buffer with standard normal variates.
    ///
    /// Empty buffers are a no-op.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}

impl RandomSource for TrialRng {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    #[inline]
    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }
}
