//! # Portfolio Metrics
//!
//! $$
//! \mathbb E[R_p]=\mathbf w^\top\boldsymbol\mu,\qquad
//! \sigma_p^2=\mathbf w^\top \Sigma \mathbf w
//! $$
//!
//! Return, variance, risk and Sharpe ratio of a weighted portfolio.

use ndarray::Array2;
use ndarray::ArrayView1;
use tracing::trace;
use tracing::warn;

use super::types::PortfolioPoint;
use crate::error::DegenerateReason;
use crate::error::MptError;
use crate::error::Result;
use crate::error::ensure_len;

/// Weights must sum to one within this tolerance.
pub const WEIGHT_TOLERANCE: f64 = 1e-3;
/// Negative variance above this is floating-point noise and clamped to zero.
pub const NEGATIVE_VARIANCE_TOLERANCE: f64 = 1e-12;

const ZERO_RISK: f64 = 1e-15;

/// Weighted sum of expected returns. Does not check that weights sum to one.
pub fn portfolio_return(weights: &[f64], expected_returns: &[f64]) -> Result<f64> {
  ensure_len("expected returns", weights.len(), expected_returns.len())?;
  Ok(
    weights
      .iter()
      .zip(expected_returns.iter())
      .map(|(w, r)| w * r)
      .sum(),
  )
}

/// Full quadratic form `w' Cov w`, possibly negative for inconsistent covariance input.
pub fn portfolio_variance(weights: &[f64], cov: &Array2<f64>) -> Result<f64> {
  ensure_len("covariance rows", weights.len(), cov.nrows())?;
  ensure_len("covariance columns", weights.len(), cov.ncols())?;
  let w = ArrayView1::from(weights);
  Ok(w.dot(&cov.dot(&w)))
}

/// Portfolio standard deviation.
///
/// Variance within [`NEGATIVE_VARIANCE_TOLERANCE`] below zero is clamped; anything more
/// negative means the correlation input is not positive semi-definite and is an error.
pub fn portfolio_risk(weights: &[f64], cov: &Array2<f64>) -> Result<f64> {
  let variance = portfolio_variance(weights, cov)?;
  if variance < -NEGATIVE_VARIANCE_TOLERANCE {
    return Err(MptError::InvalidCovariance { variance });
  }
  if variance < 0.0 {
    trace!(variance, "clamping round-off negative variance");
  }
  Ok(variance.max(0.0).sqrt())
}

/// Sharpe ratio `(expected_return - risk_free) / risk`.
pub fn sharpe_ratio(expected_return: f64, risk: f64, risk_free: f64) -> Result<f64> {
  if risk < ZERO_RISK {
    return Err(DegenerateReason::ZeroRisk.into());
  }
  Ok((expected_return - risk_free) / risk)
}

/// Reject weight vectors with non-finite entries or a sum outside `1 ± tolerance`.
pub fn validate_weights(weights: &[f64], tolerance: f64) -> Result<()> {
  if weights.iter().any(|w| !w.is_finite()) {
    return Err(MptError::InvalidInput(
      "weights must be finite numbers".to_string(),
    ));
  }
  let sum: f64 = weights.iter().sum();
  if (sum - 1.0).abs() > tolerance {
    warn!(sum, tolerance, "portfolio weights do not sum to one");
    return Err(MptError::InvalidWeights { sum, tolerance });
  }
  Ok(())
}

/// Return and risk of `weights`, without a weight-sum check.
pub(crate) fn evaluate(
  weights: Vec<f64>,
  expected_returns: &[f64],
  cov: &Array2<f64>,
) -> Result<PortfolioPoint> {
  let expected_return = portfolio_return(&weights, expected_returns)?;
  let risk = portfolio_risk(&weights, cov)?;
  Ok(PortfolioPoint::new(weights, expected_return, risk))
}

/// Checked entry point: validates weights, then computes return, risk and Sharpe ratio.
///
/// The Sharpe ratio is left `None` when the portfolio has zero risk.
pub fn evaluate_portfolio(
  weights: &[f64],
  expected_returns: &[f64],
  cov: &Array2<f64>,
  risk_free: f64,
  tolerance: f64,
) -> Result<PortfolioPoint> {
  validate_weights(weights, tolerance)?;
  let mut point = evaluate(weights.to_vec(), expected_returns, cov)?;
  point.sharpe_ratio = sharpe_ratio(point.expected_return, point.risk, risk_free).ok();
  Ok(point)
}
