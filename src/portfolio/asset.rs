//! # Assets
//!
//! $$
//! \sigma_i=\sqrt{\sigma_i^2}
//! $$
//!
//! Per-asset return and risk inputs.

use std::collections::HashSet;

use crate::error::MptError;
use crate::error::Result;

/// Fewest assets a portfolio may hold.
pub const MIN_ASSETS: usize = 2;
/// Most assets a portfolio may hold.
pub const MAX_ASSETS: usize = 10;

/// Risk of a single asset, entered either as variance or as standard deviation.
///
/// Only one value is stored; the other is derived on read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AssetRisk {
  Variance(f64),
  StdDev(f64),
}

impl AssetRisk {
  pub fn variance(self) -> f64 {
    match self {
      AssetRisk::Variance(v) => v,
      AssetRisk::StdDev(s) => s * s,
    }
  }

  pub fn std_dev(self) -> f64 {
    match self {
      AssetRisk::Variance(v) => v.sqrt(),
      AssetRisk::StdDev(s) => s,
    }
  }

  fn validate(self) -> Result<()> {
    let (label, value) = match self {
      AssetRisk::Variance(v) => ("variance", v),
      AssetRisk::StdDev(s) => ("standard deviation", s),
    };
    if value >= 0.0 && value.is_finite() {
      Ok(())
    } else {
      Err(MptError::InvalidInput(format!(
        "{label} must be a finite non-negative number, got {value}"
      )))
    }
  }
}

/// A risky asset described by its expected return and risk.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
  /// Identifier, unique within a portfolio.
  pub name: String,
  /// Expected return as a decimal (0.12 = 12%).
  pub expected_return: f64,
  pub risk: AssetRisk,
}

impl Asset {
  /// Construct an asset with its risk given in either form.
  pub fn new(name: impl Into<String>, expected_return: f64, risk: AssetRisk) -> Self {
    Self {
      name: name.into(),
      expected_return,
      risk,
    }
  }

  pub fn with_std_dev(name: impl Into<String>, expected_return: f64, std_dev: f64) -> Self {
    Self::new(name, expected_return, AssetRisk::StdDev(std_dev))
  }

  pub fn with_variance(name: impl Into<String>, expected_return: f64, variance: f64) -> Self {
    Self::new(name, expected_return, AssetRisk::Variance(variance))
  }

  pub fn variance(&self) -> f64 {
    self.risk.variance()
  }

  pub fn std_dev(&self) -> f64 {
    self.risk.std_dev()
  }

  /// Check the name, a finite expected return and a non-negative risk.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(MptError::InvalidInput("asset name is empty".to_string()));
    }
    if !self.expected_return.is_finite() {
      return Err(MptError::InvalidInput(format!(
        "expected return of {} is not finite",
        self.name
      )));
    }
    self.risk.validate()
  }
}

/// Check asset count bounds, per-asset inputs and name uniqueness.
pub fn validate_assets(assets: &[Asset]) -> Result<()> {
  if !(MIN_ASSETS..=MAX_ASSETS).contains(&assets.len()) {
    return Err(MptError::InvalidInput(format!(
      "portfolio needs {MIN_ASSETS} to {MAX_ASSETS} assets, got {}",
      assets.len()
    )));
  }

  let mut seen = HashSet::with_capacity(assets.len());
  for asset in assets {
    asset.validate()?;
    if !seen.insert(asset.name.as_str()) {
      return Err(MptError::InvalidInput(format!(
        "duplicate asset name {}",
        asset.name
      )));
    }
  }
  Ok(())
}

/// Expected returns in asset order.
pub fn expected_returns(assets: &[Asset]) -> Vec<f64> {
  assets.iter().map(|a| a.expected_return).collect()
}

/// Standard deviations in asset order.
pub fn std_devs(assets: &[Asset]) -> Vec<f64> {
  assets.iter().map(Asset::std_dev).collect()
}
