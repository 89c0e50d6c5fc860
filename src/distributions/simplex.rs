//! # Simplex Sampling
//!
//! $$
//! w_i=\frac{E_i}{\sum_j E_j},\qquad E_i=-\ln U_i\sim\operatorname{Exp}(1)
//! \ \Rightarrow\ \mathbf w\sim\operatorname{Dirichlet}(1,\dots,1)
//! $$
//!
//! Random long-only weight vectors on the probability simplex.

use rand::Rng;
use rand_distr::Distribution;
use rand_distr::Open01;

/// Weights uniformly distributed over the `dim`-asset simplex.
#[derive(Clone, Copy, Debug)]
pub struct UniformSimplex {
  pub dim: usize,
}

impl UniformSimplex {
  pub fn new(dim: usize) -> Self {
    Self { dim }
  }
}

impl Distribution<Vec<f64>> for UniformSimplex {
  fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
    let draws: Vec<f64> = (0..self.dim)
      .map(|_| {
        let u: f64 = rng.sample(Open01);
        -u.ln()
      })
      .collect();
    normalize(draws)
  }
}

/// Independent uniforms divided by their sum.
///
/// Not uniform over the simplex (mass concentrates near the centre); used for optimizer restarts.
#[derive(Clone, Copy, Debug)]
pub struct NormalizedUniform {
  pub dim: usize,
}

impl NormalizedUniform {
  pub fn new(dim: usize) -> Self {
    Self { dim }
  }
}

impl Distribution<Vec<f64>> for NormalizedUniform {
  fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
    let draws: Vec<f64> = (0..self.dim).map(|_| rng.sample(Open01)).collect();
    normalize(draws)
  }
}

fn normalize(mut draws: Vec<f64>) -> Vec<f64> {
  let total: f64 = draws.iter().sum();
  if total > 0.0 {
    for d in &mut draws {
      *d /= total;
    }
  }
  draws
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;

  #[test]
  fn simplex_weights_are_long_only_and_sum_to_one() {
    let mut rng = StdRng::seed_from_u64(1);
    let dist = UniformSimplex::new(5);
    for _ in 0..1000 {
      let w = dist.sample(&mut rng);
      assert_eq!(w.len(), 5);
      assert!(w.iter().all(|x| *x >= 0.0 && *x <= 1.0));
      assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn simplex_marginals_have_dirichlet_mean() {
    // Dirichlet(1,1,1): E[w_i] = 1/3, Var[w_i] = 2/36
    let mut rng = StdRng::seed_from_u64(2);
    let dist = UniformSimplex::new(3);
    let n = 50_000;
    let mut first = Vec::with_capacity(n);
    for _ in 0..n {
      first.push(dist.sample(&mut rng)[0]);
    }
    let m = crate::stats::mean(&first).unwrap();
    let v = crate::stats::population_variance(&first).unwrap();
    assert_abs_diff_eq!(m, 1.0 / 3.0, epsilon = 0.01);
    assert_abs_diff_eq!(v, 2.0 / 36.0, epsilon = 0.005);
  }

  #[test]
  fn normalized_uniform_sums_to_one() {
    let mut rng = StdRng::seed_from_u64(3);
    let w = NormalizedUniform::new(4).sample(&mut rng);
    assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
  }
}
