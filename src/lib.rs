//! # mpt-rs
//!
//! $$
//! \max_{\mathbf w\in\Delta}\ \frac{\mathbf w^\top\boldsymbol\mu-r_f}{\sqrt{\mathbf w^\top\Sigma\mathbf w}}
//! $$
//!
//! Modern Portfolio Theory toolkit: return statistics, simulated GBM price histories,
//! portfolio metrics, efficient frontiers, tangency portfolios and the capital market line.
//!
//! Every stochastic routine takes a caller-supplied [`rand::Rng`]; pass a seeded
//! `StdRng` for reproducible results.

pub mod distributions;
pub mod error;
pub mod portfolio;
pub mod simulation;
pub mod solvers;
pub mod stats;

pub use error::DegenerateReason;
pub use error::MptError;
pub use error::Result;
