//! Error types for the forecasting engine.
//!
//! [`EngineError`] separates user input errors ([`EngineError::InvalidParameter`])
//! from internal invariant violations that indicate a programming defect
//! ([`EngineError::AllocationMismatch`], [`EngineError::EmptyBatch`]) and from
//! execution failures of the parallel runner.

use thiserror::Error;

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the forecasting engine.
///
/// # Examples
///
/// ```
/// use forecast_engine::EngineError;
///
/// let err = EngineError::invalid("initial_capital", "must be positive, got -5");
/// assert_eq!(
///     err.to_string(),
///     "Invalid parameter 'initial_capital': must be positive, got -5"
/// );
/// assert!(!err.is_internal());
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A request or model parameter is missing, non-finite or out of range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        reason: String,
    },

    /// The generated price paths do not cover exactly the allocated tickers.
    #[error("Allocation mismatch: expected tickers {expected:?}, found {found:?}")]
    AllocationMismatch {
        /// Tickers held by the allocation.
        expected: Vec<String>,
        /// Tickers for which paths were supplied.
        found: Vec<String>,
    },

    /// Statistics were requested on a batch without trajectories.
    #[error("Empty batch: statistics require at least one trajectory")]
    EmptyBatch,

    /// A parallel worker terminated abnormally.
    #[error("Worker {worker} failed: {message}")]
    WorkerFailed {
        /// Index of the failed worker.
        worker: usize,
        /// Panic payload or failure description.
        message: String,
    },

    /// The worker thread pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `true` for invariant violations that indicate a defect in the
    /// engine rather than bad user input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::AllocationMismatch { .. } | Self::EmptyBatch)
    }
}

impl From<rayon::ThreadPoolBuildError> for EngineError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err.to_string())
    }
}
