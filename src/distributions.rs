//! # Distributions
//!
//! $$
//! Z\sim\mathcal N(0,1),\qquad \mathbf w\sim\operatorname{Dirichlet}(\mathbf 1)
//! $$
//!
//! Samplers used by the price simulator and the frontier/tangency searches.
//! All are [`rand_distr::Distribution`] implementations, so any seeded
//! [`rand::Rng`] can drive them.

pub mod box_muller;
pub mod simplex;

pub use box_muller::BoxMuller;
pub use simplex::NormalizedUniform;
pub use simplex::UniformSimplex;
