//! Convergence and mixing diagnostics for the samples produced by the walks.

use ndarray::prelude::*;
use ndarray_stats::QuantileExt;

use crate::error::{Result, WalkError};

/// Fraction of consecutive samples that differ.
///
/// For the Ball Walk this is the acceptance rate of its proposals. Hit-and-Run and the
/// Billiard Walk move at every step, so their rate is 1 almost surely.
pub fn acceptance_rate(samples: &Array2<f64>) -> Result<f64> {
    let n = samples.nrows();
    if n < 2 {
        return Err(WalkError::InvalidParameter {
            name: "samples",
            reason: format!("need at least 2 samples, but got {n}"),
        });
    }
    let moves = samples
        .rows()
        .into_iter()
        .zip(samples.rows().into_iter().skip(1))
        .filter(|(prev, next)| prev != next)
        .count();
    Ok(moves as f64 / (n - 1) as f64)
}

/// Running Gelman-Rubin statistic over several chains, updated one draw per chain at a
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct RhatMulti {
    n: usize,
    mean: Array2<f64>,    // n_chains x dim
    mean_sq: Array2<f64>, // n_chains x dim
}

impl RhatMulti {
    pub fn new(n_chains: usize, dim: usize) -> Self {
        Self {
            n: 0,
            mean: Array2::zeros((n_chains, dim)),
            mean_sq: Array2::zeros((n_chains, dim)),
        }
    }

    /// Adds one draw per chain; `x` is `n_chains x dim`.
    pub fn step(&mut self, x: ArrayView2<f64>) -> Result<()> {
        if x.shape() != self.mean.shape() {
            return Err(WalkError::DimensionMismatch {
                what: "draws per chain",
                expected: self.mean.len(),
                found: x.len(),
            });
        }
        self.n += 1;
        let n = self.n as f64;
        self.mean = (&self.mean * (n - 1.0) + &x) / n;
        self.mean_sq = (&self.mean_sq * (n - 1.0) + &x.pow2()) / n;
        Ok(())
    }

    /// Potential scale reduction per coordinate.
    pub fn all(&self) -> Result<Array1<f64>> {
        let n_chains = self.mean.nrows();
        if n_chains < 2 || self.n < 2 {
            return Err(rhat_error(format!(
                "need at least 2 chains and 2 draws, but got {n_chains} chains and {} draws",
                self.n
            )));
        }
        let n = self.n as f64;
        let mean_chain = self
            .mean
            .mean_axis(Axis(0))
            .ok_or_else(|| rhat_error("mean across chains failed".into()))?;
        let between = (&self.mean - &mean_chain.insert_axis(Axis(0)))
            .pow2()
            .sum_axis(Axis(0))
            * (n / (n_chains as f64 - 1.0));
        let sm2 = (&self.mean_sq - &self.mean.pow2()) * n / (n - 1.0);
        let within = sm2
            .mean_axis(Axis(0))
            .ok_or_else(|| rhat_error("mean of within-chain variances failed".into()))?;
        let var = &within * ((n - 1.0) / n) + between * (1.0 / n);
        Ok((var / within).sqrt())
    }

    pub fn max(&self) -> Result<f64> {
        let all = self.all()?;
        all.max().copied().map_err(|e| rhat_error(e.to_string()))
    }
}

fn rhat_error(reason: String) -> WalkError {
    WalkError::Diagnostic {
        statistic: "R-hat",
        reason,
    }
}

/// Gelman-Rubin R-hat per coordinate for samples shaped `chains x n x dim`, as returned
/// by [`crate::core::MultiChain::run`].
pub fn rhat(samples: &Array3<f64>) -> Result<Array1<f64>> {
    let (n_chains, _, dim) = samples.dim();
    let mut psr = RhatMulti::new(n_chains, dim);
    for draw in samples.axis_iter(Axis(1)) {
        psr.step(draw)?;
    }
    psr.all()
}
