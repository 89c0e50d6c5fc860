//! # Descriptive Statistics
//!
//! $$
//! s^2=\frac{1}{n-1}\sum_{i=1}^n (r_i-\bar r)^2,\qquad
//! \rho_{XY}=\frac{\operatorname{cov}(X,Y)}{\sigma_X\sigma_Y}
//! $$
//!
//! Mean, variance, covariance, correlation and geometric mean over period returns.

use crate::error::DegenerateReason;
use crate::error::Result;

/// Spread below this fraction of the largest magnitude is rounding noise.
const FLAT_REL_TOL: f64 = 1e-12;

/// Which denominator a dispersion statistic uses.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum VarianceKind {
  /// Divide by `n - 1`.
  #[default]
  Sample,
  /// Divide by `n`.
  Population,
}

impl VarianceKind {
  fn min_observations(self) -> usize {
    match self {
      VarianceKind::Sample => 2,
      VarianceKind::Population => 1,
    }
  }

  fn denominator(self, n: usize) -> f64 {
    match self {
      VarianceKind::Sample => (n - 1) as f64,
      VarianceKind::Population => n as f64,
    }
  }
}

fn require(kind: VarianceKind, n: usize) -> Result<()> {
  if n == 0 {
    return Err(DegenerateReason::EmptySeries.into());
  }
  let required = kind.min_observations();
  if n < required {
    return Err(
      DegenerateReason::InsufficientObservations {
        required,
        actual: n,
      }
      .into(),
    );
  }
  Ok(())
}

/// Arithmetic average.
pub fn mean(returns: &[f64]) -> Result<f64> {
  if returns.is_empty() {
    return Err(DegenerateReason::EmptySeries.into());
  }
  Ok(returns.iter().sum::<f64>() / returns.len() as f64)
}

/// Variance of `returns` with the selected denominator.
pub fn variance(returns: &[f64], kind: VarianceKind) -> Result<f64> {
  require(kind, returns.len())?;
  let m = mean(returns)?;
  let ss: f64 = returns.iter().map(|r| (r - m) * (r - m)).sum();
  Ok(ss / kind.denominator(returns.len()))
}

/// Sample variance, `n - 1` denominator. Needs at least two observations.
pub fn sample_variance(returns: &[f64]) -> Result<f64> {
  variance(returns, VarianceKind::Sample)
}

/// Population variance, `n` denominator.
pub fn population_variance(returns: &[f64]) -> Result<f64> {
  variance(returns, VarianceKind::Population)
}

/// Standard deviation for the selected variance kind.
pub fn std_dev(returns: &[f64], kind: VarianceKind) -> Result<f64> {
  Ok(variance(returns, kind)?.sqrt())
}

/// Covariance over the common prefix `n = min(|xs|, |ys|)`.
///
/// The longer series is truncated silently; observations are paired by position, not by date.
pub fn covariance(xs: &[f64], ys: &[f64], kind: VarianceKind) -> Result<f64> {
  let n = xs.len().min(ys.len());
  require(kind, n)?;
  let (xs, ys) = (&xs[..n], &ys[..n]);
  let mx = mean(xs)?;
  let my = mean(ys)?;
  let acc: f64 = xs
    .iter()
    .zip(ys.iter())
    .map(|(x, y)| (x - mx) * (y - my))
    .sum();
  Ok(acc / kind.denominator(n))
}

/// A series is flat when its spread is zero relative to its own magnitude.
fn is_flat(xs: &[f64], sd: f64) -> bool {
  let scale = xs.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
  sd <= scale * FLAT_REL_TOL
}

/// Pearson correlation over the common prefix.
///
/// A constant series gives `Degenerate(ZeroVariance)` rather than NaN or a clamped value.
pub fn correlation(xs: &[f64], ys: &[f64]) -> Result<f64> {
  let n = xs.len().min(ys.len());
  let cov = covariance(xs, ys, VarianceKind::Sample)?;
  let sx = std_dev(&xs[..n], VarianceKind::Sample)?;
  let sy = std_dev(&ys[..n], VarianceKind::Sample)?;
  if is_flat(&xs[..n], sx) || is_flat(&ys[..n], sy) {
    return Err(DegenerateReason::ZeroVariance.into());
  }
  Ok(cov / (sx * sy))
}

/// Geometric mean return `(prod(1 + r))^(1/n) - 1`.
///
/// Every growth factor `1 + r` must be strictly positive.
pub fn geometric_mean(returns: &[f64]) -> Result<f64> {
  if returns.is_empty() {
    return Err(DegenerateReason::EmptySeries.into());
  }
  if let Some(index) = returns.iter().position(|r| 1.0 + r <= 0.0) {
    return Err(DegenerateReason::NonPositiveGrowth { index }.into());
  }
  // log-sum keeps long series from overflowing the product
  let log_sum: f64 = returns.iter().map(|r| r.ln_1p()).sum();
  Ok((log_sum / returns.len() as f64).exp() - 1.0)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;
  use rand::Rng;
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use statrs::statistics::Statistics;

  use super::*;
  use crate::error::MptError;

  const RETURNS: [f64; 6] = [0.05, -0.02, 0.08, 0.01, -0.04, 0.03];

  fn random_series(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.random_range(-0.2..0.2)).collect()
  }

  #[test]
  fn matches_statrs_oracle() {
    let data = RETURNS.to_vec();
    assert_relative_eq!(mean(&data).unwrap(), data.iter().mean(), epsilon = 1e-14);
    assert_relative_eq!(
      sample_variance(&data).unwrap(),
      data.iter().variance(),
      epsilon = 1e-14
    );
    assert_relative_eq!(
      population_variance(&data).unwrap(),
      data.iter().population_variance(),
      epsilon = 1e-14
    );
  }

  #[test]
  fn sample_variance_dominates_population_variance() {
    let mut rng = StdRng::seed_from_u64(11);
    for n in 2..40 {
      let r = random_series(&mut rng, n);
      let s = sample_variance(&r).unwrap();
      let p = population_variance(&r).unwrap();
      assert!(s >= 0.0);
      assert!(s >= p);
    }
  }

  #[test]
  fn std_dev_is_sqrt_of_variance() {
    for kind in [VarianceKind::Sample, VarianceKind::Population] {
      let v = variance(&RETURNS, kind).unwrap();
      assert_eq!(std_dev(&RETURNS, kind).unwrap(), v.sqrt());
    }
  }

  #[test]
  fn covariance_with_self_is_variance() {
    for kind in [VarianceKind::Sample, VarianceKind::Population] {
      assert_abs_diff_eq!(
        covariance(&RETURNS, &RETURNS, kind).unwrap(),
        variance(&RETURNS, kind).unwrap(),
        epsilon = 1e-15
      );
    }
  }

  #[test]
  fn covariance_truncates_to_common_prefix() {
    let xs = [0.01, 0.02, 0.03, 0.5, -0.7];
    let ys = [0.02, 0.01, 0.04];
    let full = covariance(&xs[..3], &ys, VarianceKind::Sample).unwrap();
    assert_eq!(covariance(&xs, &ys, VarianceKind::Sample).unwrap(), full);
  }

  #[test]
  fn correlation_is_bounded() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..500 {
      let n = rng.random_range(2..30);
      let x = random_series(&mut rng, n);
      let y = random_series(&mut rng, n);
      let rho = correlation(&x, &y).unwrap();
      assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&rho), "rho = {rho}");
    }
  }

  #[test]
  fn correlation_of_linear_series_is_one() {
    let x = [0.01, 0.03, -0.02, 0.05];
    let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 0.01).collect();
    assert_abs_diff_eq!(correlation(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
  }

  #[test]
  fn correlation_of_constant_series_is_degenerate() {
    let x = [0.02, 0.02, 0.02];
    let y = [0.01, 0.03, 0.02];
    assert_eq!(
      correlation(&x, &y),
      Err(MptError::Degenerate(DegenerateReason::ZeroVariance))
    );
  }

  #[test]
  fn correlation_does_not_depend_on_scale() {
    let x = [1e-9, 2e-9, 3e-9, 5e-9];
    let y: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
    assert_abs_diff_eq!(correlation(&x, &y).unwrap(), 1.0, epsilon = 1e-12);

    let big: Vec<f64> = x.iter().map(|v| v * 1e8).collect();
    let big_y: Vec<f64> = y.iter().map(|v| v * 1e8).collect();
    assert_abs_diff_eq!(
      correlation(&big, &big_y).unwrap(),
      correlation(&x, &y).unwrap(),
      epsilon = 1e-12
    );
  }

  #[test]
  fn correlation_with_all_zero_series_is_degenerate() {
    assert_eq!(
      correlation(&[0.0; 4], &[0.01, 0.02, -0.01, 0.0]),
      Err(MptError::Degenerate(DegenerateReason::ZeroVariance))
    );
  }

  #[test]
  fn geometric_mean_never_exceeds_arithmetic_mean() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
      let r = random_series(&mut rng, 12);
      assert!(geometric_mean(&r).unwrap() <= mean(&r).unwrap() + 1e-15);
    }
    let flat = [0.04; 5];
    assert_abs_diff_eq!(geometric_mean(&flat).unwrap(), 0.04, epsilon = 1e-14);
  }

  #[test]
  fn geometric_mean_rejects_total_loss() {
    assert_eq!(
      geometric_mean(&[0.1, -1.0, 0.2]),
      Err(MptError::Degenerate(DegenerateReason::NonPositiveGrowth {
        index: 1
      }))
    );
  }

  #[test]
  fn small_inputs_are_degenerate() {
    assert_eq!(
      mean(&[]),
      Err(MptError::Degenerate(DegenerateReason::EmptySeries))
    );
    assert_eq!(
      sample_variance(&[0.1]),
      Err(MptError::Degenerate(
        DegenerateReason::InsufficientObservations {
          required: 2,
          actual: 1
        }
      ))
    );
    assert_eq!(population_variance(&[0.1]).unwrap(), 0.0);
  }
}
