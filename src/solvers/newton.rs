//! # Newton-Raphson
//!
//! $$
//! x_{k+1}=x_k-\frac{f(x_k)}{f'(x_k)}
//! $$
//!
//! Root finding for rate-solving problems such as the internal rate of return.

use roots::SimpleConvergency;
use roots::find_root_newton_raphson;
use tracing::debug;

use crate::error::DegenerateReason;
use crate::error::MptError;
use crate::error::Result;

/// Default absolute tolerance for rate solving.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;
/// Default iteration cap for rate solving.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Find a root of `f` from `guess` using its derivative `df`.
pub fn newton_raphson<F, D>(
  f: F,
  df: D,
  guess: f64,
  tolerance: f64,
  max_iterations: usize,
) -> Result<f64>
where
  F: Fn(f64) -> f64,
  D: Fn(f64) -> f64,
{
  if !(tolerance > 0.0) || max_iterations == 0 {
    return Err(MptError::InvalidInput(format!(
      "tolerance must be positive and iterations non-zero, got {tolerance} / {max_iterations}"
    )));
  }

  let mut convergency = SimpleConvergency {
    eps: tolerance,
    max_iter: max_iterations,
  };
  let root = find_root_newton_raphson(guess, &f, &df, &mut convergency)
    .map_err(|e| MptError::NoConvergence(format!("{e:?} from guess {guess}")))?;

  debug!(guess, root, "newton-raphson converged");
  Ok(root)
}

/// Net present value of `cash_flows`, the first flow at time zero.
pub fn net_present_value(rate: f64, cash_flows: &[f64]) -> f64 {
  cash_flows
    .iter()
    .enumerate()
    .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
    .sum()
}

fn npv_derivative(rate: f64, cash_flows: &[f64]) -> f64 {
  cash_flows
    .iter()
    .enumerate()
    .skip(1)
    .map(|(t, cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
    .sum()
}

/// Periodic rate at which the net present value of `cash_flows` is zero.
pub fn internal_rate_of_return(cash_flows: &[f64], guess: f64) -> Result<f64> {
  if cash_flows.len() < 2 {
    return Err(
      DegenerateReason::InsufficientObservations {
        required: 2,
        actual: cash_flows.len(),
      }
      .into(),
    );
  }
  let has_inflow = cash_flows.iter().any(|cf| *cf > 0.0);
  let has_outflow = cash_flows.iter().any(|cf| *cf < 0.0);
  if !(has_inflow && has_outflow) {
    return Err(MptError::InvalidInput(
      "cash flows need at least one sign change".to_string(),
    ));
  }

  let rate = newton_raphson(
    |r| net_present_value(r, cash_flows),
    |r| npv_derivative(r, cash_flows),
    guess,
    DEFAULT_TOLERANCE,
    DEFAULT_MAX_ITERATIONS,
  )?;

  if rate <= -1.0 || !rate.is_finite() {
    return Err(MptError::NoConvergence(format!(
      "rate {rate} is outside the domain r > -1"
    )));
  }
  Ok(rate)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn solves_square_root() {
    let root = newton_raphson(|x| x * x - 2.0, |x| 2.0 * x, 1.0, 1e-12, 50).unwrap();
    assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
  }

  #[test]
  fn irr_of_simple_investment() {
    // -100 today, 110 in one period
    let irr = internal_rate_of_return(&[-100.0, 110.0], 0.05).unwrap();
    assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-9);
  }

  #[test]
  fn irr_zeroes_npv_of_annuity() {
    let flows = [-1000.0, 300.0, 300.0, 300.0, 300.0];
    let irr = internal_rate_of_return(&flows, 0.1).unwrap();
    assert_abs_diff_eq!(net_present_value(irr, &flows), 0.0, epsilon = 1e-6);
    assert!(irr > 0.07 && irr < 0.08, "irr = {irr}");
  }

  #[test]
  fn irr_requires_sign_change() {
    assert!(matches!(
      internal_rate_of_return(&[100.0, 10.0], 0.1),
      Err(MptError::InvalidInput(_))
    ));
  }

  #[test]
  fn flat_derivative_reports_no_convergence() {
    let result = newton_raphson(|x| x * x + 1.0, |_| 0.0, 0.0, 1e-12, 20);
    assert!(matches!(result, Err(MptError::NoConvergence(_))));
  }
}
