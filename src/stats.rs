//! # Stats
//!
//! $$
//! \bar r=\frac1n\sum_i r_i,\qquad r_i=\ln\frac{P_i+D_i}{P_{i-1}}
//! $$
//!
pub mod descriptive;
pub mod returns;

pub use descriptive::VarianceKind;
pub use descriptive::correlation;
pub use descriptive::covariance;
pub use descriptive::geometric_mean;
pub use descriptive::mean;
pub use descriptive::population_variance;
pub use descriptive::sample_variance;
pub use descriptive::std_dev;
pub use descriptive::variance;
pub use returns::log_return;
pub use returns::log_returns;
pub use returns::simple_return;
pub use returns::simple_returns;
