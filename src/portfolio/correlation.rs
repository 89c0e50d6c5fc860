//! # Correlation and Covariance
//!
//! $$
//! \Sigma_{ij} = \rho_{ij}\,\sigma_i \sigma_j
//! $$
//!
//! Correlation matrix input and the covariance matrix derived from it.

use nalgebra::DMatrix;
use ndarray::Array2;
use tracing::warn;

use super::asset::Asset;
use super::asset::std_devs;
use crate::error::DegenerateReason;
use crate::error::MptError;
use crate::error::Result;
use crate::error::ensure_len;
use crate::stats::correlation;

const SYMMETRY_TOL: f64 = 1e-12;
const PSD_TOL: f64 = 1e-12;

/// Square correlation matrix with unit diagonal.
///
/// Edits go through [`CorrelationMatrix::set`], which mirrors the value across the diagonal.
/// Positive semi-definiteness is not enforced; see [`CorrelationMatrix::is_positive_semi_definite`].
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
  values: Array2<f64>,
}

impl CorrelationMatrix {
  /// Uncorrelated assets.
  pub fn identity(n: usize) -> Self {
    Self {
      values: Array2::eye(n),
    }
  }

  /// Build from rows, validating shape, diagonal, symmetry and range.
  pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
    let n = rows.len();
    let mut values = Array2::zeros((n, n));
    for (i, row) in rows.iter().enumerate() {
      ensure_len("correlation row", n, row.len())?;
      for (j, v) in row.iter().enumerate() {
        values[[i, j]] = *v;
      }
    }
    let corr = Self { values };
    corr.validate()?;
    Ok(corr)
  }

  /// Pairwise sample correlation of return series.
  ///
  /// A constant series has no defined correlation; it is treated as uncorrelated and logged.
  pub fn from_returns(series: &[Vec<f64>]) -> Result<Self> {
    let n = series.len();
    let mut corr = Self::identity(n);
    for i in 0..n {
      for j in (i + 1)..n {
        let rho = match correlation(&series[i], &series[j]) {
          Ok(rho) => rho.clamp(-1.0, 1.0),
          Err(MptError::Degenerate(DegenerateReason::ZeroVariance)) => {
            warn!(i, j, "constant return series, correlation set to 0");
            0.0
          }
          Err(e) => return Err(e),
        };
        corr.set(i, j, rho)?;
      }
    }
    Ok(corr)
  }

  pub fn dim(&self) -> usize {
    self.values.nrows()
  }

  pub fn get(&self, i: usize, j: usize) -> f64 {
    self.values[[i, j]]
  }

  pub fn as_array(&self) -> &Array2<f64> {
    &self.values
  }

  /// Set `rho(i, j)` and its mirror `rho(j, i)`.
  pub fn set(&mut self, i: usize, j: usize, rho: f64) -> Result<()> {
    let n = self.dim();
    if i >= n || j >= n {
      return Err(MptError::InvalidInput(format!(
        "correlation index ({i}, {j}) out of range for {n} assets"
      )));
    }
    if i == j {
      return if rho == 1.0 {
        Ok(())
      } else {
        Err(MptError::InvalidInput(format!(
          "diagonal correlation is fixed at 1, got {rho}"
        )))
      };
    }
    if !(-1.0..=1.0).contains(&rho) {
      return Err(MptError::InvalidInput(format!(
        "correlation must lie in [-1, 1], got {rho}"
      )));
    }
    self.values[[i, j]] = rho;
    self.values[[j, i]] = rho;
    Ok(())
  }

  /// Check finiteness, shape, unit diagonal, symmetry and the `[-1, 1]` range.
  pub fn validate(&self) -> Result<()> {
    let n = self.dim();
    ensure_len("correlation columns", n, self.values.ncols())?;
    if let Some(((i, j), v)) = self.values.indexed_iter().find(|(_, v)| !v.is_finite()) {
      return Err(MptError::InvalidInput(format!(
        "correlation ({i}, {j}) must be finite, got {v}"
      )));
    }
    for i in 0..n {
      if (self.values[[i, i]] - 1.0).abs() > SYMMETRY_TOL {
        return Err(MptError::InvalidInput(format!(
          "diagonal entry {i} must be 1, got {}",
          self.values[[i, i]]
        )));
      }
      for j in (i + 1)..n {
        let (a, b) = (self.values[[i, j]], self.values[[j, i]]);
        if (a - b).abs() > SYMMETRY_TOL {
          return Err(MptError::InvalidInput(format!(
            "correlation matrix is not symmetric at ({i}, {j}): {a} vs {b}"
          )));
        }
        if !(-1.0..=1.0).contains(&a) {
          return Err(MptError::InvalidInput(format!(
            "correlation ({i}, {j}) must lie in [-1, 1], got {a}"
          )));
        }
      }
    }
    Ok(())
  }

  /// Smallest eigenvalue is non-negative within tolerance.
  pub fn is_positive_semi_definite(&self) -> bool {
    let n = self.dim();
    if n == 0 {
      return true;
    }
    let m = DMatrix::from_fn(n, n, |i, j| self.values[[i, j]]);
    m.symmetric_eigenvalues()
      .iter()
      .all(|lambda| *lambda >= -PSD_TOL)
  }
}

/// Covariance matrix from per-asset volatilities and a correlation matrix.
pub fn covariance_from_sigmas(sigmas: &[f64], corr: &CorrelationMatrix) -> Result<Array2<f64>> {
  let n = sigmas.len();
  ensure_len("correlation matrix", n, corr.dim())?;
  // upper triangle order for both halves keeps the matrix bitwise symmetric
  Ok(Array2::from_shape_fn((n, n), |(i, j)| {
    let (a, b) = (i.min(j), i.max(j));
    corr.get(a, b) * (sigmas[a] * sigmas[b])
  }))
}

/// Covariance matrix of `assets` under `corr`.
pub fn covariance_matrix(assets: &[Asset], corr: &CorrelationMatrix) -> Result<Array2<f64>> {
  covariance_from_sigmas(&std_devs(assets), corr)
}
