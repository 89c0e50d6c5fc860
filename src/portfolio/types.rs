//! # Portfolio Types
//!
//! $$
//! (\mathbf w,\ \mathbb E[R_p],\ \sigma_p,\ S_p)
//! $$
//!
//! Shared result containers for frontier and tangency computations.

/// A portfolio on (or inside) the risk/return plane.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioPoint {
  /// Weight per asset, in asset order.
  pub weights: Vec<f64>,
  /// Expected portfolio return.
  pub expected_return: f64,
  /// Portfolio standard deviation.
  pub risk: f64,
  /// `(expected_return - risk_free) / risk`, when computed and defined.
  pub sharpe_ratio: Option<f64>,
}

impl PortfolioPoint {
  pub fn new(weights: Vec<f64>, expected_return: f64, risk: f64) -> Self {
    Self {
      weights,
      expected_return,
      risk,
      sharpe_ratio: None,
    }
  }
}

/// The two halves of a two-asset frontier split at the minimum-variance point.
///
/// The minimum-variance point is the last element of `inefficient` and the first of `efficient`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontierSegments {
  /// Points with returns at or below the minimum-variance return.
  pub inefficient: Vec<PortfolioPoint>,
  /// Points with returns at or above the minimum-variance return.
  pub efficient: Vec<PortfolioPoint>,
}

/// Exact frontier between two assets with all other weights held at zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PairwiseFrontier {
  /// Indices of the two assets, `first < second`.
  pub assets: (usize, usize),
  pub points: Vec<PortfolioPoint>,
}
