//! # Tangency Portfolio
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}\in\Delta} \frac{\mathbf w^\top\boldsymbol\mu-r_f}{\sqrt{\mathbf w^\top\Sigma\mathbf w}}
//! $$
//!
//! Sharpe-ratio maximisation over the long-only simplex.
//!
//! Two assets are solved by a fine grid sweep. Three or more assets use a
//! multi-start pairwise hill climb: a local, first-improvement search that is
//! not guaranteed to reach the global optimum. [`analytic_tangency`] gives the
//! unconstrained closed form `w ∝ Σ⁻¹(μ - r_f 1)` for comparison.

use nalgebra::DMatrix;
use nalgebra::DVector;
use ndarray::Array2;
use rand::Rng;
use rand_distr::Distribution;
use tracing::debug;
use tracing::info;

use super::metrics::evaluate;
use super::metrics::portfolio_return;
use super::metrics::portfolio_risk;
use super::metrics::sharpe_ratio;
use super::types::PortfolioPoint;
use crate::distributions::NormalizedUniform;
use crate::error::DegenerateReason;
use crate::error::MptError;
use crate::error::Result;
use crate::error::ensure_len;

/// Search parameters for the tangency optimizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TangencyConfig {
  /// Grid points for the two-asset sweep.
  pub two_asset_steps: usize,
  /// Independent random starts of the hill climb.
  pub restarts: usize,
  /// Iteration cap per start.
  pub max_iterations: usize,
  /// Weight moved between two assets per move.
  pub step: f64,
}

impl Default for TangencyConfig {
  fn default() -> Self {
    Self {
      two_asset_steps: 501,
      restarts: 20,
      max_iterations: 100,
      step: 0.02,
    }
  }
}

impl TangencyConfig {
  /// Check grid size, restart and iteration counts, and the step size.
  pub fn validate(&self) -> Result<()> {
    if self.two_asset_steps < 2 || self.restarts == 0 || self.max_iterations == 0 {
      return Err(MptError::InvalidInput(
        "tangency search needs at least two grid points, one restart and one iteration"
          .to_string(),
      ));
    }
    if !(self.step > 0.0 && self.step < 1.0) {
      return Err(MptError::InvalidInput(format!(
        "tangency step must lie in (0, 1), got {}",
        self.step
      )));
    }
    Ok(())
  }
}

/// Sharpe ratio of `weights`, `-inf` where risk is zero.
fn score(weights: &[f64], mu: &[f64], cov: &Array2<f64>, risk_free: f64) -> Result<f64> {
  let ret = portfolio_return(weights, mu)?;
  let risk = portfolio_risk(weights, cov)?;
  match sharpe_ratio(ret, risk, risk_free) {
    Ok(s) => Ok(s),
    Err(MptError::Degenerate(DegenerateReason::ZeroRisk)) => Ok(f64::NEG_INFINITY),
    Err(e) => Err(e),
  }
}

fn finish(
  weights: Vec<f64>,
  mu: &[f64],
  cov: &Array2<f64>,
  risk_free: f64,
) -> Result<PortfolioPoint> {
  let mut point = evaluate(weights, mu, cov)?;
  point.sharpe_ratio = Some(sharpe_ratio(point.expected_return, point.risk, risk_free)?);
  Ok(point)
}

fn check_inputs(mu: &[f64], cov: &Array2<f64>) -> Result<usize> {
  let n = mu.len();
  ensure_len("covariance rows", n, cov.nrows())?;
  ensure_len("covariance columns", n, cov.ncols())?;
  Ok(n)
}

/// Best Sharpe ratio on an evenly spaced grid of `w_0` in `[0, 1]`.
pub fn tangency_two_asset(
  mu: &[f64],
  cov: &Array2<f64>,
  risk_free: f64,
  steps: usize,
) -> Result<PortfolioPoint> {
  ensure_len("two-asset inputs", 2, check_inputs(mu, cov)?)?;
  if steps < 2 {
    return Err(MptError::InvalidInput(
      "a sweep needs at least two points".to_string(),
    ));
  }

  let last = (steps - 1) as f64;
  let mut best: Option<(Vec<f64>, f64)> = None;
  for k in 0..steps {
    let w = k as f64 / last;
    let weights = vec![w, 1.0 - w];
    let s = score(&weights, mu, cov, risk_free)?;
    if s.is_finite() && best.as_ref().map_or(true, |(_, b)| s > *b) {
      best = Some((weights, s));
    }
  }

  let (weights, _) = best.ok_or(MptError::Degenerate(DegenerateReason::ZeroRisk))?;
  finish(weights, mu, cov, risk_free)
}

/// One hill-climb run from `start`; returns the final weights and their Sharpe ratio.
fn hill_climb(
  mut weights: Vec<f64>,
  mu: &[f64],
  cov: &Array2<f64>,
  risk_free: f64,
  config: &TangencyConfig,
) -> Result<(Vec<f64>, f64)> {
  let n = weights.len();
  let mut current = score(&weights, mu, cov, risk_free)?;

  for _ in 0..config.max_iterations {
    let mut improved = false;

    'pairs: for i in 0..n {
      for j in (i + 1)..n {
        for (from, to) in [(i, j), (j, i)] {
          if weights[from] < config.step {
            continue;
          }
          let mut candidate = weights.clone();
          candidate[from] -= config.step;
          candidate[to] += config.step;
          let s = score(&candidate, mu, cov, risk_free)?;
          if s > current {
            weights = candidate;
            current = s;
            improved = true;
            break 'pairs;
          }
        }
      }
    }

    if !improved {
      break;
    }
  }

  Ok((weights, current))
}

/// Multi-start pairwise hill climb over the long-only simplex.
///
/// Each move shifts `config.step` of weight from one asset to another and is
/// accepted on the first improvement found, scanning pairs in index order.
/// A run stops when no move improves or after `config.max_iterations` moves.
pub fn tangency_search<R: Rng + ?Sized>(
  mu: &[f64],
  cov: &Array2<f64>,
  risk_free: f64,
  config: &TangencyConfig,
  rng: &mut R,
) -> Result<PortfolioPoint> {
  config.validate()?;
  let n = check_inputs(mu, cov)?;
  if n < 2 {
    return Err(MptError::InvalidInput(format!(
      "tangency search needs at least two assets, got {n}"
    )));
  }

  let starts = NormalizedUniform::new(n);
  let mut best: Option<(Vec<f64>, f64)> = None;
  for run in 0..config.restarts {
    let (weights, s) = hill_climb(starts.sample(rng), mu, cov, risk_free, config)?;
    debug!(run, sharpe = s, "tangency restart finished");
    if s.is_finite() && best.as_ref().map_or(true, |(_, b)| s > *b) {
      best = Some((weights, s));
    }
  }

  let (weights, sharpe) = best.ok_or(MptError::Degenerate(DegenerateReason::ZeroRisk))?;
  info!(assets = n, sharpe, "tangency search finished");
  finish(weights, mu, cov, risk_free)
}

/// Tangency portfolio: grid sweep for two assets, hill climb otherwise.
pub fn tangency_portfolio<R: Rng + ?Sized>(
  mu: &[f64],
  cov: &Array2<f64>,
  risk_free: f64,
  config: &TangencyConfig,
  rng: &mut R,
) -> Result<PortfolioPoint> {
  config.validate()?;
  match check_inputs(mu, cov)? {
    2 => tangency_two_asset(mu, cov, risk_free, config.two_asset_steps),
    _ => tangency_search(mu, cov, risk_free, config, rng),
  }
}

/// Unconstrained tangency portfolio `Σ⁻¹(μ - r_f 1)` scaled to sum to one.
///
/// Short positions are allowed. When the scaled excess returns sum to a
/// negative number the result is the minimum-Sharpe portfolio, which the
/// returned Sharpe ratio makes visible.
pub fn analytic_tangency(mu: &[f64], cov: &Array2<f64>, risk_free: f64) -> Result<PortfolioPoint> {
  let n = check_inputs(mu, cov)?;
  let sigma = DMatrix::from_fn(n, n, |i, j| cov[[i, j]]);
  let inv = sigma
    .try_inverse()
    .ok_or(MptError::Degenerate(DegenerateReason::SingularCovariance))?;
  let excess = DVector::from_iterator(n, mu.iter().map(|m| m - risk_free));
  let z = inv * excess;
  let total = z.sum();
  if total.abs() < 1e-15 {
    return Err(MptError::InvalidInput(
      "excess returns admit no tangency portfolio".to_string(),
    ));
  }

  let weights: Vec<f64> = z.iter().map(|v| v / total).collect();
  finish(weights, mu, cov, risk_free)
}
