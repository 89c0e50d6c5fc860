//! # Box-Muller
//!
//! $$
//! Z=\sqrt{-2\ln U_1}\,\cos(2\pi U_2),\qquad U_1,U_2\sim\mathcal U(0,1)
//! $$
//!
use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::Distribution;
use rand_distr::Open01;

/// Standard normal variates from the Box-Muller transform.
#[derive(Default, Clone, Copy, Debug)]
pub struct BoxMuller;

impl BoxMuller {
  /// Both variates of one transform, `(cos, sin)` branch.
  pub fn sample_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
    // Open01 excludes 0, so ln(u1) is finite
    let u1: f64 = rng.sample(Open01);
    let u2: f64 = rng.sample(Open01);
    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = TAU * u2;
    (radius * angle.cos(), radius * angle.sin())
  }
}

impl Distribution<f64> for BoxMuller {
  fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
    self.sample_pair(rng).0
  }
}
