//! # Geometric Brownian Motion Prices
//!
//! $$
//! S_{i}=S_{i-1}\exp\!\Big(\big(\mu-\tfrac12\sigma^2\big)\Delta t+\sigma\sqrt{\Delta t}\,Z_i\Big)
//! $$
//!
use impl_new_derive::ImplNew;
use rand::Rng;
use rand_distr::Distribution;
use tracing::debug;

use super::calendar::Frequency;
use crate::distributions::BoxMuller;
use crate::error::MptError;
use crate::error::Result;

/// Exact log-normal discretisation of a GBM price path.
#[derive(ImplNew, Clone, Debug)]
pub struct PricePath {
  /// Price at the first observation, must be positive.
  pub initial_price: f64,
  /// Number of prices returned, including the initial one.
  pub num_points: usize,
  /// Annualised drift `mu`.
  pub annual_return: f64,
  /// Annualised volatility `sigma`, must be non-negative.
  pub annual_volatility: f64,
  pub frequency: Frequency,
}

impl PricePath {
  /// Check price, point count, volatility and drift.
  pub fn validate(&self) -> Result<()> {
    if !(self.initial_price > 0.0) || !self.initial_price.is_finite() {
      return Err(MptError::InvalidInput(format!(
        "initial price must be positive, got {}",
        self.initial_price
      )));
    }
    if self.num_points == 0 {
      return Err(MptError::InvalidInput(
        "price path needs at least one point".to_string(),
      ));
    }
    if !(self.annual_volatility >= 0.0) {
      return Err(MptError::InvalidInput(format!(
        "annual volatility must be non-negative, got {}",
        self.annual_volatility
      )));
    }
    if !self.annual_return.is_finite() {
      return Err(MptError::InvalidInput(format!(
        "annual return must be finite, got {}",
        self.annual_return
      )));
    }
    Ok(())
  }

  /// Per-step log drift `(mu - sigma^2 / 2) * dt`.
  pub fn drift_per_step(&self) -> f64 {
    let dt = self.frequency.time_step();
    (self.annual_return - 0.5 * self.annual_volatility * self.annual_volatility) * dt
  }

  /// Draw a fresh path from `rng`.
  pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
    self.validate()?;

    let dt = self.frequency.time_step();
    let drift_dt = self.drift_per_step();
    let vol_sdt = self.annual_volatility * dt.sqrt();

    let mut prices = Vec::with_capacity(self.num_points);
    let mut s = self.initial_price;
    prices.push(s);
    for _ in 1..self.num_points {
      let z: f64 = BoxMuller.sample(rng);
      s *= (drift_dt + vol_sdt * z).exp();
      prices.push(s);
    }

    debug!(
      points = self.num_points,
      frequency = %self.frequency,
      last = s,
      "sampled GBM price path"
    );
    Ok(prices)
  }
}

/// Convenience wrapper around [`PricePath::sample`].
pub fn generate_price_path<R: Rng + ?Sized>(
  initial_price: f64,
  num_points: usize,
  annual_return: f64,
  annual_volatility: f64,
  frequency: Frequency,
  rng: &mut R,
) -> Result<Vec<f64>> {
  PricePath::new(
    initial_price,
    num_points,
    annual_return,
    annual_volatility,
    frequency,
  )
  .sample(rng)
}
