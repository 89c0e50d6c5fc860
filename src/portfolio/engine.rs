//! # Portfolio Engine
//!
//! $$
//! (\boldsymbol\mu,\ \rho,\ \boldsymbol\sigma,\ r_f)\ \mapsto\ (\Sigma,\ \text{frontier},\ \mathbf w_T,\ \text{CML})
//! $$
//!
//! High-level orchestration: one immutable input snapshot in, every derived artifact out.

use ndarray::Array2;
use rand::Rng;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::asset::Asset;
use super::asset::expected_returns;
use super::asset::validate_assets;
use super::capital_line::CapitalAllocationLine;
use super::capital_line::capital_market_line;
use super::correlation::CorrelationMatrix;
use super::correlation::covariance_matrix;
use super::frontier::EfficientFrontier;
use super::frontier::FrontierConfig;
use super::frontier::build_frontier;
use super::metrics::WEIGHT_TOLERANCE;
use super::metrics::evaluate_portfolio;
use super::tangency::TangencyConfig;
use super::tangency::tangency_portfolio;
use super::types::PortfolioPoint;
use crate::error::MptError;
use crate::error::Result;
use crate::error::ensure_len;
use crate::simulation::Frequency;
use crate::simulation::PriceHistory;
use crate::simulation::estimate_inputs;

/// Lowest accepted risk-free rate.
pub const MIN_RISK_FREE: f64 = 0.0;
/// Highest accepted risk-free rate.
pub const MAX_RISK_FREE: f64 = 0.10;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioEngineConfig {
  /// Risk-free rate for Sharpe ratios and the capital market line.
  pub risk_free: f64,
  pub frontier: FrontierConfig,
  pub tangency: TangencyConfig,
  /// Allowed distance of the weight sum from one.
  pub weight_tolerance: f64,
  /// Points sampled along the capital market line.
  pub cml_points: usize,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      risk_free: 0.02,
      frontier: FrontierConfig::default(),
      tangency: TangencyConfig::default(),
      weight_tolerance: WEIGHT_TOLERANCE,
      cml_points: 50,
    }
  }
}

impl PortfolioEngineConfig {
  /// Check the risk-free range, tolerance, CML size and the nested search configs.
  pub fn validate(&self) -> Result<()> {
    if !(MIN_RISK_FREE..=MAX_RISK_FREE).contains(&self.risk_free) {
      return Err(MptError::InvalidInput(format!(
        "risk-free rate must lie in [{MIN_RISK_FREE}, {MAX_RISK_FREE}], got {}",
        self.risk_free
      )));
    }
    if !(self.weight_tolerance > 0.0) {
      return Err(MptError::InvalidInput(format!(
        "weight tolerance must be positive, got {}",
        self.weight_tolerance
      )));
    }
    if self.cml_points < 2 {
      return Err(MptError::InvalidInput(
        "capital market line needs at least two points".to_string(),
      ));
    }
    self.frontier.validate()?;
    self.tangency.validate()
  }
}

/// Where the asset statistics came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
  /// Entered directly.
  #[default]
  Manual,
  /// Estimated from simulated price histories.
  Historical,
}

/// Immutable snapshot of everything the engine reads.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioInput {
  pub assets: Vec<Asset>,
  pub correlation: CorrelationMatrix,
  /// The user's current allocation, if any.
  pub weights: Option<Vec<f64>>,
  pub mode: InputMode,
}

impl PortfolioInput {
  /// Manually entered inputs without a current allocation.
  pub fn manual(assets: Vec<Asset>, correlation: CorrelationMatrix) -> Self {
    Self {
      assets,
      correlation,
      weights: None,
      mode: InputMode::Manual,
    }
  }

  /// Inputs estimated from simulated histories.
  pub fn from_history(histories: &[PriceHistory], frequency: Frequency) -> Result<Self> {
    let (assets, correlation) = estimate_inputs(histories, frequency)?;
    Ok(Self {
      assets,
      correlation,
      weights: None,
      mode: InputMode::Historical,
    })
  }

  /// Attach the user's current allocation.
  pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
    self.weights = Some(weights);
    self
  }

  /// Check assets, correlation shape and values, and the weight length.
  pub fn validate(&self) -> Result<()> {
    validate_assets(&self.assets)?;
    ensure_len("correlation matrix", self.assets.len(), self.correlation.dim())?;
    self.correlation.validate()?;
    if let Some(w) = &self.weights {
      ensure_len("weights", self.assets.len(), w.len())?;
    }
    Ok(())
  }
}

/// Every artifact derived from one [`PortfolioInput`].
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioAnalysis {
  pub covariance: Array2<f64>,
  /// Whether the correlation input is a valid correlation matrix.
  pub positive_semi_definite: bool,
  /// Metrics of the user's weights, when supplied.
  pub current: Option<PortfolioPoint>,
  pub frontier: EfficientFrontier,
  pub tangency: PortfolioPoint,
  pub cml: CapitalAllocationLine,
  /// `(risk, expected_return)` along the CML up to the riskiest frontier point.
  pub cml_points: Vec<(f64, f64)>,
}

impl PortfolioAnalysis {
  /// The MVP for two assets, the MGP otherwise.
  pub fn minimum(&self) -> &PortfolioPoint {
    self.frontier.minimum()
  }
}

/// Stateless entry point for portfolio analysis.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  fn current_metrics(
    &self,
    input: &PortfolioInput,
    cov: &Array2<f64>,
  ) -> Result<Option<PortfolioPoint>> {
    let mu = expected_returns(&input.assets);
    input
      .weights
      .as_deref()
      .map(|w| {
        evaluate_portfolio(
          w,
          &mu,
          cov,
          self.config.risk_free,
          self.config.weight_tolerance,
        )
      })
      .transpose()
  }

  /// Run the full analysis.
  ///
  /// Invalid user weights fail the whole analysis with [`MptError::InvalidWeights`].
  /// A correlation matrix that is not positive semi-definite is logged and fails only
  /// if some evaluated portfolio ends up with materially negative variance.
  pub fn analyze<R: Rng + ?Sized>(
    &self,
    input: &PortfolioInput,
    rng: &mut R,
  ) -> Result<PortfolioAnalysis> {
    self.config.validate()?;
    input.validate()?;
    let rf = self.config.risk_free;
    info!(
      assets = input.assets.len(),
      mode = ?input.mode,
      risk_free = rf,
      "starting portfolio analysis"
    );

    let mu = expected_returns(&input.assets);
    let covariance = covariance_matrix(&input.assets, &input.correlation)?;
    let positive_semi_definite = input.correlation.is_positive_semi_definite();
    if !positive_semi_definite {
      warn!("correlation matrix is not positive semi-definite");
    }

    let current = self.current_metrics(input, &covariance)?;
    let frontier = build_frontier(&mu, &covariance, &self.config.frontier, rng)?;
    let tangency = tangency_portfolio(&mu, &covariance, rf, &self.config.tangency, rng)?;
    let cml = capital_market_line(rf, &tangency)?;
    let max_risk = frontier
      .points()
      .iter()
      .map(|p| p.risk)
      .fold(tangency.risk, f64::max);
    let cml_points = cml.points(max_risk, self.config.cml_points)?;

    info!(
      minimum_risk = frontier.minimum().risk,
      tangency_sharpe = cml.slope,
      "portfolio analysis finished"
    );
    Ok(PortfolioAnalysis {
      covariance,
      positive_semi_definite,
      current,
      frontier,
      tangency,
      cml,
      cml_points,
    })
  }
}

#[derive(Clone, Debug, PartialEq)]
struct AnalysisKey {
  assets: Vec<Asset>,
  correlation: CorrelationMatrix,
  risk_free: f64,
  num_portfolios: usize,
  mode: InputMode,
}

impl AnalysisKey {
  fn new(input: &PortfolioInput, config: &PortfolioEngineConfig) -> Self {
    Self {
      assets: input.assets.clone(),
      correlation: input.correlation.clone(),
      risk_free: config.risk_free,
      num_portfolios: config.frontier.num_portfolios,
      mode: input.mode,
    }
  }
}

#[derive(Clone, Debug)]
struct CachedAnalysis {
  key: AnalysisKey,
  weights: Option<Vec<f64>>,
  analysis: PortfolioAnalysis,
}

/// [`PortfolioEngine`] that keeps the last analysis.
///
/// The frontier and tangency search rerun only when the assets, correlation matrix,
/// risk-free rate, sample count or input mode change. A change of the user's weights
/// only refreshes [`PortfolioAnalysis::current`].
#[derive(Clone, Debug, Default)]
pub struct MemoizedEngine {
  engine: PortfolioEngine,
  cached: Option<CachedAnalysis>,
  computations: usize,
}

impl MemoizedEngine {
  /// Construct an engine with an empty cache.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self {
      engine: PortfolioEngine::new(config),
      cached: None,
      computations: 0,
    }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    self.engine.config()
  }

  /// Change the risk-free rate; the next analysis recomputes.
  pub fn set_risk_free(&mut self, risk_free: f64) {
    self.engine.config.risk_free = risk_free;
  }

  /// Change the Monte-Carlo sample count; the next analysis recomputes.
  pub fn set_num_portfolios(&mut self, num_portfolios: usize) {
    self.engine.config.frontier.num_portfolios = num_portfolios;
  }

  /// Number of full analyses run so far.
  pub fn computations(&self) -> usize {
    self.computations
  }

  /// Drop the cached analysis.
  pub fn invalidate(&mut self) {
    self.cached = None;
  }

  /// Cached analysis of `input`, recomputed only when a cache-key field changed.
  pub fn analyze<R: Rng + ?Sized>(
    &mut self,
    input: &PortfolioInput,
    rng: &mut R,
  ) -> Result<&PortfolioAnalysis> {
    let key = AnalysisKey::new(input, self.engine.config());
    let hit = self.cached.as_ref().is_some_and(|c| c.key == key);

    if !hit {
      let analysis = self.engine.analyze(input, rng)?;
      self.computations += 1;
      self.cached = Some(CachedAnalysis {
        key,
        weights: input.weights.clone(),
        analysis,
      });
    }

    let engine = &self.engine;
    match self.cached.as_mut() {
      Some(cached) => {
        if cached.weights != input.weights {
          debug!("weights changed, refreshing current portfolio only");
          input.validate()?;
          cached.analysis.current = engine.current_metrics(input, &cached.analysis.covariance)?;
          cached.weights = input.weights.clone();
        }
        Ok(&cached.analysis)
      }
      None => Err(MptError::InvalidInput("no analysis available".to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use tracing_test::traced_test;

  use super::*;
  use crate::simulation::AssetSimulationSpec;
  use crate::simulation::SimulationConfig;
  use crate::simulation::simulate_history;

  fn two_assets() -> PortfolioInput {
    let assets = vec![
      Asset::with_std_dev("A", 0.12, 0.20),
      Asset::with_std_dev("B", 0.08, 0.30),
    ];
    let mut corr = CorrelationMatrix::identity(2);
    corr.set(0, 1, 0.4).unwrap();
    PortfolioInput::manual(assets, corr)
  }

  fn three_assets() -> PortfolioInput {
    let assets = vec![
      Asset::with_std_dev("Bonds", 0.05, 0.08),
      Asset::with_std_dev("Equity", 0.10, 0.18),
      Asset::with_std_dev("Emerging", 0.14, 0.28),
    ];
    let mut corr = CorrelationMatrix::identity(3);
    corr.set(0, 1, 0.2).unwrap();
    corr.set(0, 2, 0.1).unwrap();
    corr.set(1, 2, 0.6).unwrap();
    PortfolioInput::manual(assets, corr)
  }

  fn small_config() -> PortfolioEngineConfig {
    PortfolioEngineConfig {
      frontier: FrontierConfig {
        num_portfolios: 1_000,
        ..FrontierConfig::default()
      },
      ..PortfolioEngineConfig::default()
    }
  }

  #[test]
  fn two_asset_analysis() {
    let engine = PortfolioEngine::default();
    let input = two_assets().with_weights(vec![0.7, 0.3]);
    let mut rng = StdRng::seed_from_u64(1);
    let analysis = engine.analyze(&input, &mut rng).unwrap();

    let current = analysis.current.as_ref().unwrap();
    assert_abs_diff_eq!(current.risk, 0.03778_f64.sqrt(), epsilon = 1e-12);
    assert!(matches!(analysis.frontier, EfficientFrontier::TwoAsset { .. }));
    assert_eq!(analysis.frontier.points().len(), 101);
    assert!(analysis.positive_semi_definite);

    let t = &analysis.tangency;
    assert_abs_diff_eq!(
      analysis.cml.expected_return_at(t.risk),
      t.expected_return,
      epsilon = 1e-12
    );
    assert_eq!(analysis.cml_points.len(), 50);
    assert_eq!(analysis.cml_points[0], (0.0, 0.02));
    assert!(analysis.minimum().risk <= current.risk);
  }

  #[test]
  fn tangency_dominates_every_sampled_portfolio() {
    let engine = PortfolioEngine::new(small_config());
    let mut rng = StdRng::seed_from_u64(8);
    let analysis = engine.analyze(&three_assets(), &mut rng).unwrap();
    let rf = engine.config().risk_free;

    let best = analysis.tangency.sharpe_ratio.unwrap();
    let sampled_best = analysis
      .frontier
      .points()
      .iter()
      .map(|p| (p.expected_return - rf) / p.risk)
      .fold(f64::NEG_INFINITY, f64::max);
    assert!(best >= sampled_best - 5e-3, "{best} vs {sampled_best}");
    assert!(analysis.current.is_none());
  }

  #[test]
  #[traced_test]
  fn invalid_weights_block_the_analysis() {
    let engine = PortfolioEngine::default();
    let input = two_assets().with_weights(vec![0.5, 0.3]);
    let result = engine.analyze(&input, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(MptError::InvalidWeights { .. })));
    assert!(logs_contain("portfolio weights do not sum to one"));
  }

  #[test]
  #[traced_test]
  fn inconsistent_correlation_is_reported() {
    let assets = vec![
      Asset::with_std_dev("A", 0.1, 0.2),
      Asset::with_std_dev("B", 0.1, 0.2),
      Asset::with_std_dev("C", 0.1, 0.2),
    ];
    let rows = vec![
      vec![1.0, 0.9, -0.9],
      vec![0.9, 1.0, 0.9],
      vec![-0.9, 0.9, 1.0],
    ];
    let corr = CorrelationMatrix::from_rows(&rows).unwrap();
    let input = PortfolioInput::manual(assets, corr);
    let engine = PortfolioEngine::new(small_config());

    // long-only mixes still have positive variance here
    let analysis = engine.analyze(&input, &mut StdRng::seed_from_u64(4)).unwrap();
    assert!(!analysis.positive_semi_definite);
    assert!(logs_contain("not positive semi-definite"));

    // a short position exposes the negative variance
    let shorted = input.with_weights(vec![1.0, -1.0, 1.0]);
    let result = engine.analyze(&shorted, &mut StdRng::seed_from_u64(4));
    assert!(matches!(result, Err(MptError::InvalidCovariance { variance }) if variance < 0.0));
  }

  #[test]
  fn rejects_out_of_range_configuration() {
    let config = PortfolioEngineConfig {
      risk_free: 0.15,
      ..PortfolioEngineConfig::default()
    };
    assert!(config.validate().is_err());

    let engine = PortfolioEngine::new(config);
    assert!(engine
      .analyze(&two_assets(), &mut StdRng::seed_from_u64(0))
      .is_err());
  }

  #[test]
  fn mismatched_weight_length_is_rejected() {
    let input = two_assets().with_weights(vec![0.2, 0.3, 0.5]);
    assert!(matches!(
      input.validate(),
      Err(MptError::DimensionMismatch { .. })
    ));
  }

  #[test]
  fn memoized_engine_recomputes_only_on_relevant_changes() {
    let mut memo = MemoizedEngine::new(small_config());
    let mut rng = StdRng::seed_from_u64(12);
    let input = three_assets();

    let first = memo.analyze(&input, &mut rng).unwrap().tangency.clone();
    let again = memo.analyze(&input, &mut rng).unwrap().tangency.clone();
    assert_eq!(first, again);
    assert_eq!(memo.computations(), 1);

    let weighted = input.clone().with_weights(vec![0.3, 0.4, 0.3]);
    let current = memo.analyze(&weighted, &mut rng).unwrap().current.clone();
    assert!(current.is_some());
    assert_eq!(memo.computations(), 1);

    memo.set_risk_free(0.04);
    memo.analyze(&weighted, &mut rng).unwrap();
    assert_eq!(memo.computations(), 2);

    memo.set_num_portfolios(2_000);
    let analysis = memo.analyze(&weighted, &mut rng).unwrap();
    assert_eq!(analysis.frontier.points().len(), 2_000);
    assert_eq!(memo.computations(), 3);

    let mut edited = weighted.clone();
    edited.correlation.set(0, 1, 0.3).unwrap();
    memo.analyze(&edited, &mut rng).unwrap();
    assert_eq!(memo.computations(), 4);
  }

  #[test]
  fn historical_mode_feeds_the_engine() {
    let specs = vec![
      AssetSimulationSpec::new("Steady".to_string(), 100.0, 0.06, 0.10, true, 0.03),
      AssetSimulationSpec::new("Growth".to_string(), 40.0, 0.12, 0.25, false, 0.0),
      AssetSimulationSpec::new("Venture".to_string(), 10.0, 0.18, 0.40, false, 0.0),
    ];
    let config = SimulationConfig {
      years: 3,
      frequency: Frequency::Weekly,
      ..SimulationConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(77);
    let histories = simulate_history(&specs, &config, &mut rng).unwrap();
    let input = PortfolioInput::from_history(&histories, config.frequency).unwrap();
    assert_eq!(input.mode, InputMode::Historical);
    assert_eq!(input.assets.len(), 3);

    let analysis = PortfolioEngine::new(small_config())
      .analyze(&input, &mut rng)
      .unwrap();
    assert!(analysis.positive_semi_definite);
    assert!(matches!(analysis.frontier, EfficientFrontier::Sampled { .. }));
  }
}
