//! # Simulated Price History
//!
//! $$
//! \hat\mu = m\,\bar r,\qquad \hat\sigma^2 = m\,s_r^2
//! $$
//!
//! Synthetic dated price, dividend and return series per asset, and the annualised
//! inputs estimated from them (`m` periods per year).

use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use rand::Rng;
use tracing::debug;
use tracing::info;

use super::calendar::Frequency;
use super::calendar::generate_date_sequence;
use super::dividends::generate_dividends;
use super::gbm::PricePath;
use crate::error::MptError;
use crate::error::Result;
use crate::portfolio::Asset;
use crate::portfolio::CorrelationMatrix;
use crate::stats::log_returns;
use crate::stats::mean;
use crate::stats::sample_variance;

/// Simulation horizons offered, in years.
pub const SIMULATION_YEARS: [u32; 4] = [1, 3, 5, 10];

/// Parameters of one simulated asset.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct AssetSimulationSpec {
  pub name: String,
  pub initial_price: f64,
  pub annual_return: f64,
  pub annual_volatility: f64,
  pub pays_dividend: bool,
  /// Annual dividend yield, paid in four equal parts.
  pub dividend_yield: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
  /// Horizon in years, one of [`SIMULATION_YEARS`].
  pub years: u32,
  pub frequency: Frequency,
  pub start_date: NaiveDate,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      years: 5,
      frequency: Frequency::Daily,
      start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
    }
  }
}

impl SimulationConfig {
  /// Observations per path, the start point included.
  pub fn num_points(&self) -> usize {
    self.years as usize * self.frequency.periods_per_year() as usize + 1
  }

  /// Check that the horizon is one of [`SIMULATION_YEARS`].
  pub fn validate(&self) -> Result<()> {
    if !SIMULATION_YEARS.contains(&self.years) {
      return Err(MptError::InvalidInput(format!(
        "simulation horizon must be one of {SIMULATION_YEARS:?} years, got {}",
        self.years
      )));
    }
    Ok(())
  }
}

/// One asset's simulated series; all vectors are aligned by index.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceHistory {
  pub name: String,
  pub dates: Vec<NaiveDate>,
  pub prices: Vec<f64>,
  pub dividends: Vec<f64>,
  /// Log returns with the `0.0` sentinel at index 0.
  pub returns: Vec<f64>,
}

impl PriceHistory {
  /// Returns without the leading sentinel.
  pub fn period_returns(&self) -> &[f64] {
    self.returns.get(1..).unwrap_or(&[])
  }
}

/// Generate a fresh history per asset. Every call replaces the previous data wholesale.
pub fn simulate_history<R: Rng + ?Sized>(
  specs: &[AssetSimulationSpec],
  config: &SimulationConfig,
  rng: &mut R,
) -> Result<Vec<PriceHistory>> {
  config.validate()?;
  let dates = generate_date_sequence(config.start_date, config.num_points(), config.frequency);
  if dates.len() != config.num_points() {
    return Err(MptError::InvalidInput(
      "simulation calendar runs past the last representable date".to_string(),
    ));
  }

  let mut out = Vec::with_capacity(specs.len());
  for spec in specs {
    let prices = PricePath::new(
      spec.initial_price,
      dates.len(),
      spec.annual_return,
      spec.annual_volatility,
      config.frequency,
    )
    .sample(rng)?;
    let dividends = generate_dividends(&dates, &prices, spec.dividend_yield, spec.pays_dividend)?;
    let returns = log_returns(&prices, &dividends)?;
    debug!(asset = %spec.name, points = prices.len(), "simulated price history");
    out.push(PriceHistory {
      name: spec.name.clone(),
      dates: dates.clone(),
      prices,
      dividends,
      returns,
    });
  }

  info!(
    assets = out.len(),
    years = config.years,
    frequency = %config.frequency,
    "generated historical simulation"
  );
  Ok(out)
}

/// Annualised expected returns, variances and pairwise correlations of the histories.
///
/// The return sentinel is excluded, so each history needs at least three prices.
pub fn estimate_inputs(
  histories: &[PriceHistory],
  frequency: Frequency,
) -> Result<(Vec<Asset>, CorrelationMatrix)> {
  let periods = frequency.periods_per_year() as f64;
  let mut assets = Vec::with_capacity(histories.len());
  let mut series = Vec::with_capacity(histories.len());

  for history in histories {
    let r = history.period_returns();
    let mu = mean(r)? * periods;
    let var = sample_variance(r)? * periods;
    assets.push(Asset::with_variance(history.name.clone(), mu, var));
    series.push(r.to_vec());
  }

  let correlation = CorrelationMatrix::from_returns(&series)?;
  Ok((assets, correlation))
}
