//! # Efficient Frontier
//!
//! $$
//! \mathbf w_{\min}=\arg\min_{\mathbf w\in\Delta}\ \mathbf w^\top\Sigma\mathbf w,
//! \qquad \Delta=\{\mathbf w\ge 0,\ \mathbf 1^\top\mathbf w=1\}
//! $$
//!
//! Exact two-asset sweeps and Monte-Carlo sampling of the long-only simplex.
//!
//! For two assets the sweep is the whole opportunity set and its minimum is the
//! minimum-variance portfolio (MVP). For three or more assets the minimum of the
//! sampled cloud (MGP) only approximates the true minimum; more samples tighten it.

use ndarray::Array2;
use rand::Rng;
use rand_distr::Distribution;
use tracing::debug;

use super::metrics::evaluate;
use super::types::FrontierSegments;
use super::types::PairwiseFrontier;
use super::types::PortfolioPoint;
use crate::distributions::UniformSimplex;
use crate::error::DegenerateReason;
use crate::error::MptError;
use crate::error::Result;
use crate::error::ensure_len;

/// Smallest Monte-Carlo sample count.
pub const MIN_PORTFOLIOS: usize = 1_000;
/// Largest Monte-Carlo sample count.
pub const MAX_PORTFOLIOS: usize = 15_000;
/// Sample counts are multiples of this.
pub const PORTFOLIO_STEP: usize = 1_000;

/// Resolution and sample size of frontier construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontierConfig {
  /// Points in the two-asset sweep, endpoints included.
  pub two_asset_steps: usize,
  /// Points in each pairwise sub-frontier for three or more assets.
  pub pairwise_steps: usize,
  /// Random portfolios drawn for three or more assets.
  pub num_portfolios: usize,
}

impl Default for FrontierConfig {
  fn default() -> Self {
    Self {
      two_asset_steps: 101,
      pairwise_steps: 51,
      num_portfolios: 5_000,
    }
  }
}

impl FrontierConfig {
  /// Check sweep resolutions and the sample count bounds and step.
  pub fn validate(&self) -> Result<()> {
    if self.two_asset_steps < 2 || self.pairwise_steps < 2 {
      return Err(MptError::InvalidInput(
        "frontier sweeps need at least two points".to_string(),
      ));
    }
    if !(MIN_PORTFOLIOS..=MAX_PORTFOLIOS).contains(&self.num_portfolios)
      || self.num_portfolios % PORTFOLIO_STEP != 0
    {
      return Err(MptError::InvalidInput(format!(
        "sample count must be a multiple of {PORTFOLIO_STEP} in {MIN_PORTFOLIOS}..={MAX_PORTFOLIOS}, got {}",
        self.num_portfolios
      )));
    }
    Ok(())
  }
}

/// Frontier for the given number of assets.
#[derive(Clone, Debug, PartialEq)]
pub enum EfficientFrontier {
  /// Exact sweep between two assets.
  TwoAsset {
    points: Vec<PortfolioPoint>,
    /// Index of the minimum-variance portfolio in `points`.
    minimum_variance: usize,
    segments: FrontierSegments,
  },
  /// Random long-only portfolios plus exact pairwise sub-frontiers.
  Sampled {
    points: Vec<PortfolioPoint>,
    /// Index of the lowest-risk sampled portfolio in `points`.
    minimum_global: usize,
    pairwise: Vec<PairwiseFrontier>,
  },
}

impl EfficientFrontier {
  pub fn points(&self) -> &[PortfolioPoint] {
    match self {
      EfficientFrontier::TwoAsset { points, .. } | EfficientFrontier::Sampled { points, .. } => {
        points
      }
    }
  }

  /// The MVP for two assets, the MGP otherwise.
  pub fn minimum(&self) -> &PortfolioPoint {
    match self {
      EfficientFrontier::TwoAsset {
        points,
        minimum_variance,
        ..
      } => &points[*minimum_variance],
      EfficientFrontier::Sampled {
        points,
        minimum_global,
        ..
      } => &points[*minimum_global],
    }
  }
}

fn check_inputs(expected_returns: &[f64], cov: &Array2<f64>) -> Result<usize> {
  let n = expected_returns.len();
  ensure_len("covariance rows", n, cov.nrows())?;
  ensure_len("covariance columns", n, cov.ncols())?;
  Ok(n)
}

/// Sweep `w_first` from 0 to 1 in `steps` equal increments with `w_second = 1 - w_first`.
///
/// All other weights stay at zero.
pub fn pair_sweep(
  expected_returns: &[f64],
  cov: &Array2<f64>,
  first: usize,
  second: usize,
  steps: usize,
) -> Result<Vec<PortfolioPoint>> {
  let n = check_inputs(expected_returns, cov)?;
  if first >= n || second >= n || first == second {
    return Err(MptError::InvalidInput(format!(
      "invalid asset pair ({first}, {second}) for {n} assets"
    )));
  }
  if steps < 2 {
    return Err(MptError::InvalidInput(
      "a sweep needs at least two points".to_string(),
    ));
  }

  let last = (steps - 1) as f64;
  (0..steps)
    .map(|k| {
      let w = k as f64 / last;
      let mut weights = vec![0.0; n];
      weights[first] = w;
      weights[second] = 1.0 - w;
      evaluate(weights, expected_returns, cov)
    })
    .collect()
}

/// Two-asset frontier, ordered by increasing weight in the first asset.
pub fn two_asset_frontier(
  expected_returns: &[f64],
  cov: &Array2<f64>,
  steps: usize,
) -> Result<Vec<PortfolioPoint>> {
  ensure_len("two-asset inputs", 2, expected_returns.len())?;
  pair_sweep(expected_returns, cov, 0, 1, steps)
}

/// Index of the lowest-risk point; the first one wins ties.
pub fn minimum_risk_index(points: &[PortfolioPoint]) -> Option<usize> {
  let mut best: Option<(usize, f64)> = None;
  for (i, p) in points.iter().enumerate() {
    match best {
      Some((_, risk)) if p.risk >= risk => {}
      _ => best = Some((i, p.risk)),
    }
  }
  best.map(|(i, _)| i)
}

/// Split a sweep at `index`, the minimum point belonging to both halves.
///
/// The half whose far end has the higher return is the efficient one.
pub fn split_frontier(points: &[PortfolioPoint], index: usize) -> FrontierSegments {
  if points.is_empty() || index >= points.len() {
    return FrontierSegments::default();
  }
  let prefix = points[..=index].to_vec();
  let suffix = points[index..].to_vec();
  let first_return = points[0].expected_return;
  let last_return = points[points.len() - 1].expected_return;

  if first_return > last_return {
    // sweep runs from high to low return, so the prefix is the efficient half
    let mut efficient = prefix;
    efficient.reverse();
    let mut inefficient = suffix;
    inefficient.reverse();
    FrontierSegments {
      inefficient,
      efficient,
    }
  } else {
    FrontierSegments {
      inefficient: prefix,
      efficient: suffix,
    }
  }
}

/// Closed-form minimum-variance weight of the first of two assets, clamped to `[0, 1]`.
///
/// `w_A = (s_B^2 - rho s_A s_B) / (s_A^2 + s_B^2 - 2 rho s_A s_B)`
pub fn min_variance_weight(sigma_a: f64, sigma_b: f64, rho: f64) -> Result<f64> {
  let cov_ab = rho * sigma_a * sigma_b;
  let denom = sigma_a * sigma_a + sigma_b * sigma_b - 2.0 * cov_ab;
  if denom.abs() < 1e-15 {
    return Err(DegenerateReason::ZeroVariance.into());
  }
  Ok(((sigma_b * sigma_b - cov_ab) / denom).clamp(0.0, 1.0))
}

/// `num_portfolios` random long-only portfolios drawn uniformly from the simplex.
pub fn sample_portfolios<R: Rng + ?Sized>(
  expected_returns: &[f64],
  cov: &Array2<f64>,
  num_portfolios: usize,
  rng: &mut R,
) -> Result<Vec<PortfolioPoint>> {
  let n = check_inputs(expected_returns, cov)?;
  let simplex = UniformSimplex::new(n);
  (0..num_portfolios)
    .map(|_| evaluate(simplex.sample(rng), expected_returns, cov))
    .collect()
}

/// Exact sub-frontier for every unordered asset pair, in `(0,1), (0,2), ..., (n-2,n-1)` order.
pub fn pairwise_frontiers(
  expected_returns: &[f64],
  cov: &Array2<f64>,
  steps: usize,
) -> Result<Vec<PairwiseFrontier>> {
  let n = check_inputs(expected_returns, cov)?;
  let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
  for i in 0..n {
    for j in (i + 1)..n {
      out.push(PairwiseFrontier {
        assets: (i, j),
        points: pair_sweep(expected_returns, cov, i, j, steps)?,
      });
    }
  }
  Ok(out)
}

/// Build the frontier appropriate to the asset count.
pub fn build_frontier<R: Rng + ?Sized>(
  expected_returns: &[f64],
  cov: &Array2<f64>,
  config: &FrontierConfig,
  rng: &mut R,
) -> Result<EfficientFrontier> {
  config.validate()?;
  let n = check_inputs(expected_returns, cov)?;

  match n {
    0 | 1 => Err(MptError::InvalidInput(format!(
      "a frontier needs at least two assets, got {n}"
    ))),
    2 => {
      let points = two_asset_frontier(expected_returns, cov, config.two_asset_steps)?;
      let minimum_variance =
        minimum_risk_index(&points).ok_or(MptError::Degenerate(DegenerateReason::EmptySeries))?;
      let segments = split_frontier(&points, minimum_variance);
      debug!(
        points = points.len(),
        mvp_risk = points[minimum_variance].risk,
        "built two-asset frontier"
      );
      Ok(EfficientFrontier::TwoAsset {
        points,
        minimum_variance,
        segments,
      })
    }
    _ => {
      let points = sample_portfolios(expected_returns, cov, config.num_portfolios, rng)?;
      let minimum_global =
        minimum_risk_index(&points).ok_or(MptError::Degenerate(DegenerateReason::EmptySeries))?;
      let pairwise = pairwise_frontiers(expected_returns, cov, config.pairwise_steps)?;
      debug!(
        assets = n,
        samples = points.len(),
        pairs = pairwise.len(),
        mgp_risk = points[minimum_global].risk,
        "built sampled frontier"
      );
      Ok(EfficientFrontier::Sampled {
        points,
        minimum_global,
        pairwise,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;
  use crate::portfolio::correlation::CorrelationMatrix;
  use crate::portfolio::correlation::covariance_from_sigmas;

  fn cov_of(sigmas: &[f64], rho: f64) -> Array2<f64> {
    let n = sigmas.len();
    let mut corr = CorrelationMatrix::identity(n);
    for i in 0..n {
      for j in (i + 1)..n {
        corr.set(i, j, rho).unwrap();
      }
    }
    covariance_from_sigmas(sigmas, &corr).unwrap()
  }

  #[test]
  fn two_asset_sweep_shape() {
    let cov = cov_of(&[0.15, 0.25], 0.3);
    let points = two_asset_frontier(&[0.08, 0.14], &cov, 101).unwrap();
    assert_eq!(points.len(), 101);
    assert_eq!(points[0].weights, vec![0.0, 1.0]);
    assert_eq!(points[100].weights, vec![1.0, 0.0]);
    assert_abs_diff_eq!(points[50].weights[0], 0.5, epsilon = 1e-15);
    for p in &points {
      assert_abs_diff_eq!(p.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn minimum_variance_point_is_lowest_risk() {
    let cov = cov_of(&[0.15, 0.25], 0.3);
    let points = two_asset_frontier(&[0.08, 0.14], &cov, 101).unwrap();
    let idx = minimum_risk_index(&points).unwrap();
    assert!(points.iter().all(|p| points[idx].risk <= p.risk));
    assert_abs_diff_eq!(points[idx].weights[0], 0.82, epsilon = 1e-12);
  }

  #[test]
  fn analytic_minimum_variance_weight() {
    let w = min_variance_weight(0.15, 0.25, 0.3).unwrap();
    assert_abs_diff_eq!(w, 0.82, epsilon = 1e-12);
    assert!(min_variance_weight(0.2, 0.2, 1.0).is_err());
    // a dominated asset with perfect correlation pins the weight to a corner
    assert_eq!(min_variance_weight(0.1, 0.3, 1.0).unwrap(), 1.0);
  }

  #[test]
  fn ties_keep_first_occurrence() {
    let points = vec![
      PortfolioPoint::new(vec![1.0], 0.1, 0.2),
      PortfolioPoint::new(vec![1.0], 0.2, 0.1),
      PortfolioPoint::new(vec![1.0], 0.3, 0.1),
    ];
    assert_eq!(minimum_risk_index(&points), Some(1));
    assert_eq!(minimum_risk_index(&[]), None);
  }

  #[test]
  fn segments_share_the_minimum_point() {
    let cov = cov_of(&[0.15, 0.25], 0.3);
    let points = two_asset_frontier(&[0.14, 0.08], &cov, 101).unwrap();
    let idx = minimum_risk_index(&points).unwrap();
    let seg = split_frontier(&points, idx);

    assert_eq!(seg.inefficient.len() + seg.efficient.len(), points.len() + 1);
    assert_eq!(seg.inefficient.last(), Some(&points[idx]));
    assert_eq!(seg.efficient.first(), Some(&points[idx]));
    let mvp_return = points[idx].expected_return;
    assert!(seg.efficient.iter().all(|p| p.expected_return >= mvp_return - 1e-15));
    assert!(seg.inefficient.iter().all(|p| p.expected_return <= mvp_return + 1e-15));
  }

  #[test]
  fn sampled_frontier_for_three_assets() {
    let mut rng = StdRng::seed_from_u64(21);
    let mu = [0.08, 0.12, 0.15];
    let cov = cov_of(&[0.15, 0.2, 0.3], 0.25);
    let config = FrontierConfig {
      num_portfolios: 2_000,
      ..FrontierConfig::default()
    };
    let frontier = build_frontier(&mu, &cov, &config, &mut rng).unwrap();

    let EfficientFrontier::Sampled {
      points,
      minimum_global,
      pairwise,
    } = &frontier
    else {
      panic!("expected sampled frontier");
    };
    assert_eq!(points.len(), 2_000);
    assert_eq!(pairwise.len(), 3);
    assert_eq!(pairwise[2].assets, (1, 2));
    assert!(pairwise.iter().all(|p| p.points.len() == 51));
    assert!(points.iter().all(|p| frontier.minimum().risk <= p.risk));
    assert_eq!(frontier.minimum(), &points[*minimum_global]);
  }

  #[test]
  fn sampled_minimum_approaches_the_exact_minimum() {
    // zero correlation: exact min-variance weights are proportional to 1 / sigma^2
    let sigmas = [0.1, 0.2, 0.3];
    let cov = cov_of(&sigmas, 0.0);
    let inv: Vec<f64> = sigmas.iter().map(|s| 1.0 / (s * s)).collect();
    let exact_var = 1.0 / inv.iter().sum::<f64>();

    let mut rng = StdRng::seed_from_u64(8);
    let points = sample_portfolios(&[0.1, 0.1, 0.1], &cov, 15_000, &mut rng).unwrap();
    let mgp = &points[minimum_risk_index(&points).unwrap()];
    assert!(mgp.risk >= exact_var.sqrt() - 1e-12);
    assert!(mgp.risk - exact_var.sqrt() < 2e-3, "mgp risk {}", mgp.risk);
  }

  #[test]
  fn config_bounds() {
    assert!(FrontierConfig::default().validate().is_ok());
    let bad = FrontierConfig {
      num_portfolios: 500,
      ..FrontierConfig::default()
    };
    assert!(bad.validate().is_err());
    let bad = FrontierConfig {
      num_portfolios: 2_500,
      ..FrontierConfig::default()
    };
    assert!(bad.validate().is_err());
  }
}
