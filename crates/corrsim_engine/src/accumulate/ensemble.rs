//! Completed path ensemble.

use crate::batch::TimeBatch;

/// Balances of every path at every step, read-only once complete.
///
/// # Examples
///
/// ```
/// use corrsim_engine::accumulate::PathEnsemble;
/// use corrsim_engine::batch::TimeBatch;
///
/// let balances = TimeBatch::from_vec(2, 2, vec![1.0, 2.0, 1.5, 3.0]).unwrap();
/// let ensemble = PathEnsemble::new(balances, Some(7));
/// assert_eq!(ensemble.terminal(), &[1.5, 3.0]);
/// assert_eq!(ensemble.trajectories(5), vec![vec![1.0, 1.5], vec![2.0, 3.0]]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PathEnsemble {
    balances: TimeBatch,
    seed: Option<u64>,
}

impl PathEnsemble {
    /// Wraps a `[steps][paths]` balance batch and the seed that produced it.
    pub fn new(balances: TimeBatch, seed: Option<u64>) -> Self {
        Self { balances, seed }
    }

    /// All balances.
    #[inline]
    pub fn balances(&self) -> &TimeBatch {
        &self.balances
    }

    /// Number of time steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.balances.steps()
    }

    /// Number of paths.
    #[inline]
    pub fn paths(&self) -> usize {
        self.balances.paths()
    }

    /// Balances after the last step.
    #[inline]
    pub fn terminal(&self) -> &[f64] {
        self.balances.terminal()
    }

    /// The first `min(max, paths)` trajectories, one `Vec` per path.
    pub fn trajectories(&self, max: usize) -> Vec<Vec<f64>> {
        (0..max.min(self.paths()))
            .map(|p| self.balances.path(p))
            .collect()
    }

    /// Seed of the generator that produced the ensemble, if known.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Consumes the ensemble, returning the balance batch.
    #[inline]
    pub fn into_batch(self) -> TimeBatch {
        self.balances
    }
}
