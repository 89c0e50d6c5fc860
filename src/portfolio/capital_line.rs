//! # Capital Allocation Line
//!
//! $$
//! \mathbb E[R](\sigma)=r_f+\frac{\mathbb E[R_T]-r_f}{\sigma_T}\,\sigma
//! $$
//!
//! Mixes of the risk-free asset and a risky portfolio `T`. With `T` the tangency
//! portfolio this is the capital market line.

use super::metrics::sharpe_ratio;
use super::types::PortfolioPoint;
use crate::error::MptError;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapitalAllocationLine {
  pub risk_free: f64,
  /// Reward per unit of risk, the Sharpe ratio of the anchor portfolio.
  pub slope: f64,
}

impl CapitalAllocationLine {
  /// Line from `risk_free` through `portfolio`. Fails when the portfolio has zero risk.
  pub fn through(risk_free: f64, portfolio: &PortfolioPoint) -> Result<Self> {
    let slope = sharpe_ratio(portfolio.expected_return, portfolio.risk, risk_free)?;
    Ok(Self { risk_free, slope })
  }

  pub fn expected_return_at(&self, risk: f64) -> f64 {
    self.risk_free + self.slope * risk
  }

  /// `(risk, expected_return)` pairs for `n` evenly spaced risks in `[0, max_risk]`.
  pub fn points(&self, max_risk: f64, n: usize) -> Result<Vec<(f64, f64)>> {
    if n < 2 || !(max_risk > 0.0) {
      return Err(MptError::InvalidInput(format!(
        "capital line needs n >= 2 and positive max risk, got n = {n}, max risk = {max_risk}"
      )));
    }
    let last = (n - 1) as f64;
    Ok(
      (0..n)
        .map(|k| {
          let risk = max_risk * k as f64 / last;
          (risk, self.expected_return_at(risk))
        })
        .collect(),
    )
  }

  /// Fraction held in the risky portfolio to reach `target_risk`; above one means borrowing.
  pub fn risky_fraction(&self, target_risk: f64, portfolio_risk: f64) -> Result<f64> {
    if portfolio_risk <= 0.0 {
      return Err(MptError::InvalidInput(
        "risky portfolio must have positive risk".to_string(),
      ));
    }
    Ok(target_risk / portfolio_risk)
  }
}

/// Capital market line through the tangency portfolio.
pub fn capital_market_line(risk_free: f64, tangency: &PortfolioPoint) -> Result<CapitalAllocationLine> {
  CapitalAllocationLine::through(risk_free, tangency)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::error::DegenerateReason;

  #[test]
  fn line_passes_through_anchor() {
    let anchor = PortfolioPoint::new(vec![0.5, 0.5], 0.11, 0.15);
    let line = capital_market_line(0.02, &anchor).unwrap();
    assert_abs_diff_eq!(line.slope, 0.6, epsilon = 1e-12);
    assert_abs_diff_eq!(line.expected_return_at(0.0), 0.02, epsilon = 1e-15);
    assert_abs_diff_eq!(line.expected_return_at(0.15), 0.11, epsilon = 1e-12);
  }

  #[test]
  fn evenly_spaced_points() {
    let line = CapitalAllocationLine {
      risk_free: 0.03,
      slope: 0.5,
    };
    let pts = line.points(0.4, 5).unwrap();
    assert_eq!(pts.len(), 5);
    assert_eq!(pts[0], (0.0, 0.03));
    assert_abs_diff_eq!(pts[4].0, 0.4, epsilon = 1e-15);
    assert_abs_diff_eq!(pts[4].1, 0.23, epsilon = 1e-12);
    assert!(line.points(0.4, 1).is_err());
  }

  #[test]
  fn leverage_beyond_the_anchor() {
    let line = CapitalAllocationLine {
      risk_free: 0.02,
      slope: 0.4,
    };
    assert_abs_diff_eq!(line.risky_fraction(0.3, 0.2).unwrap(), 1.5, epsilon = 1e-12);
  }

  #[test]
  fn riskless_anchor_is_degenerate() {
    let anchor = PortfolioPoint::new(vec![1.0], 0.05, 0.0);
    assert_eq!(
      CapitalAllocationLine::through(0.02, &anchor),
      Err(MptError::Degenerate(DegenerateReason::ZeroRisk))
    );
  }
}
