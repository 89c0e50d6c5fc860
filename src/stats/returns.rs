//! # Return Derivation
//!
//! $$
//! r_0 = 0,\qquad r_i=\ln\frac{P_i+D_i}{P_{i-1}}
//! $$
//!
//! Period returns from parallel price and dividend series.

use crate::error::DegenerateReason;
use crate::error::MptError;
use crate::error::Result;
use crate::error::ensure_len;

fn validate_series(prices: &[f64], dividends: &[f64]) -> Result<()> {
  if prices.is_empty() {
    return Err(DegenerateReason::EmptySeries.into());
  }
  ensure_len("dividend series", prices.len(), dividends.len())?;
  if let Some(i) = prices.iter().position(|p| !(*p > 0.0)) {
    return Err(MptError::InvalidInput(format!(
      "price at index {i} must be strictly positive, got {}",
      prices[i]
    )));
  }
  if let Some(i) = dividends.iter().position(|d| *d < 0.0) {
    return Err(MptError::InvalidInput(format!(
      "dividend at index {i} must be non-negative, got {}",
      dividends[i]
    )));
  }
  Ok(())
}

/// Single-period log return including the dividend paid at the end of the period.
pub fn log_return(previous_price: f64, price: f64, dividend: f64) -> f64 {
  ((price + dividend) / previous_price).ln()
}

/// Single-period simple return `(P1 + D) / P0 - 1`.
pub fn simple_return(previous_price: f64, price: f64, dividend: f64) -> f64 {
  (price + dividend) / previous_price - 1.0
}

/// Log returns aligned with `prices`; the first element is the `0.0` sentinel.
pub fn log_returns(prices: &[f64], dividends: &[f64]) -> Result<Vec<f64>> {
  validate_series(prices, dividends)?;
  let mut out = Vec::with_capacity(prices.len());
  out.push(0.0);
  for i in 1..prices.len() {
    out.push(log_return(prices[i - 1], prices[i], dividends[i]));
  }
  Ok(out)
}

/// Simple returns aligned with `prices`; the first element is the `0.0` sentinel.
pub fn simple_returns(prices: &[f64], dividends: &[f64]) -> Result<Vec<f64>> {
  validate_series(prices, dividends)?;
  let mut out = Vec::with_capacity(prices.len());
  out.push(0.0);
  for i in 1..prices.len() {
    out.push(simple_return(prices[i - 1], prices[i], dividends[i]));
  }
  Ok(out)
}
