//! # Errors
//!
//! $$
//! \text{outcome} \in \{\mathrm{Ok}(x),\ \mathrm{Degenerate}(r),\ \mathrm{Invalid}(\cdot)\}
//! $$
//!
//! Typed outcomes for statistics, portfolio metrics and optimizers.

use thiserror::Error;

/// Why a numerically well-formed input has no defined result.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum DegenerateReason {
  /// The series has no observations.
  #[error("empty series")]
  EmptySeries,
  /// The statistic needs more observations than were supplied.
  #[error("needs at least {required} observations, got {actual}")]
  InsufficientObservations { required: usize, actual: usize },
  /// A standard deviation in a denominator is zero (constant series).
  #[error("zero variance")]
  ZeroVariance,
  /// A growth factor `1 + r` at `index` is not strictly positive.
  #[error("growth factor 1 + r is not positive at index {index}")]
  NonPositiveGrowth { index: usize },
  /// Portfolio risk is zero, so the Sharpe ratio is undefined.
  #[error("zero portfolio risk")]
  ZeroRisk,
  /// The covariance matrix cannot be inverted.
  #[error("singular covariance matrix")]
  SingularCovariance,
}

/// Error type for portfolio theory computations.
#[derive(Debug, Error, PartialEq)]
pub enum MptError {
  /// Result is undefined for the given input.
  #[error("degenerate result: {0}")]
  Degenerate(#[from] DegenerateReason),

  /// Computed variance is negative, the correlation input is not positive semi-definite.
  #[error("invalid covariance: computed portfolio variance {variance} is negative")]
  InvalidCovariance { variance: f64 },

  /// Weights do not sum to one.
  #[error("weights sum to {sum}, expected 1 within {tolerance}")]
  InvalidWeights { sum: f64, tolerance: f64 },

  /// Lengths of related inputs disagree.
  #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
  DimensionMismatch {
    what: &'static str,
    expected: usize,
    actual: usize,
  },

  /// Parameter outside its domain.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Iterative solver failed.
  #[error("no convergence: {0}")]
  NoConvergence(String),
}

/// Result type for portfolio theory computations.
pub type Result<T> = std::result::Result<T, MptError>;

pub(crate) fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
  if expected == actual {
    Ok(())
  } else {
    Err(MptError::DimensionMismatch {
      what,
      expected,
      actual,
    })
  }
}
