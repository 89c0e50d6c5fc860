//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Mean-variance portfolio analysis: metrics, frontiers, tangency and the capital market line.

pub mod asset;
pub mod capital_line;
pub mod correlation;
pub mod engine;
pub mod frontier;
pub mod metrics;
pub mod tangency;
pub mod types;

pub use asset::Asset;
pub use asset::AssetRisk;
pub use asset::MAX_ASSETS;
pub use asset::MIN_ASSETS;
pub use asset::validate_assets;
pub use capital_line::CapitalAllocationLine;
pub use capital_line::capital_market_line;
pub use correlation::CorrelationMatrix;
pub use correlation::covariance_from_sigmas;
pub use correlation::covariance_matrix;
pub use engine::InputMode;
pub use engine::MAX_RISK_FREE;
pub use engine::MIN_RISK_FREE;
pub use engine::MemoizedEngine;
pub use engine::PortfolioAnalysis;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use engine::PortfolioInput;
pub use frontier::EfficientFrontier;
pub use frontier::FrontierConfig;
pub use frontier::build_frontier;
pub use frontier::min_variance_weight;
pub use frontier::minimum_risk_index;
pub use frontier::pairwise_frontiers;
pub use frontier::sample_portfolios;
pub use frontier::split_frontier;
pub use frontier::two_asset_frontier;
pub use metrics::WEIGHT_TOLERANCE;
pub use metrics::evaluate_portfolio;
pub use metrics::portfolio_return;
pub use metrics::portfolio_risk;
pub use metrics::portfolio_variance;
pub use metrics::sharpe_ratio;
pub use metrics::validate_weights;
pub use tangency::TangencyConfig;
pub use tangency::analytic_tangency;
pub use tangency::tangency_portfolio;
pub use tangency::tangency_search;
pub use tangency::tangency_two_asset;
pub use types::FrontierSegments;
pub use types::PairwiseFrontier;
pub use types::PortfolioPoint;
