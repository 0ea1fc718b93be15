//! Reusable `[steps][paths]` buffers for the path accumulator.
//!
//! # Memory Layout
//!
//! All three buffers are step-major with a row stride equal to the logical
//! path count, so the values of one step across all paths are contiguous:
//! - `growth`: growth factor `g_t` per step and path
//! - `contributions`: contribution `c_t` per step and path
//! - `balances`: balance after step `t` per path

use corrsim_core::types::DomainError;

use crate::batch::TimeBatch;

/// Pre-allocated workspace for path accumulation.
///
/// Buffers grow on demand and are never shrunk, so repeated runs of the same
/// size allocate only once.
///
/// # Examples
///
/// ```rust
/// use corrsim_engine::accumulate::AccumulationWorkspace;
///
/// let mut workspace = AccumulationWorkspace::new(100, 12);
/// workspace.ensure_capacity(1_000, 240);
/// assert!(workspace.capacity_paths() >= 1_000);
/// assert_eq!(workspace.size_steps(), 240);
/// ```
#[derive(Debug)]
pub struct AccumulationWorkspace {
    growth: Vec<f64>,
    contributions: Vec<f64>,
    balances: Vec<f64>,
    capacity_paths: usize,
    capacity_steps: usize,
    size_paths: usize,
    size_steps: usize,
}

/// Borrowed inputs and output of one time step.
#[derive(Debug)]
pub struct StepBuffers<'a> {
    /// Balances after the previous step, `None` at `t = 0`.
    pub previous: Option<&'a [f64]>,
    /// Contributions for this step.
    pub contributions: &'a [f64],
    /// Growth factors for this step.
    pub growth: &'a [f64],
    /// Balances after this step.
    pub balances: &'a mut [f64],
}

impl AccumulationWorkspace {
    /// Creates a workspace with the given initial capacity.
    pub fn new(n_paths: usize, n_steps: usize) -> Self {
        let size = n_paths * n_steps;
        Self {
            growth: vec![0.0; size],
            contributions: vec![0.0; size],
            balances: vec![0.0; size],
            capacity_paths: n_paths,
            capacity_steps: n_steps,
            size_paths: n_paths,
            size_steps: n_steps,
        }
    }

    /// Ensures capacity for `n_paths × n_steps` and sets the logical size.
    ///
    /// Grows with a doubling strategy; never shrinks.
    pub fn ensure_capacity(&mut self, n_paths: usize, n_steps: usize) {
        let needs_growth = n_paths > self.capacity_paths || n_steps > self.capacity_steps;

        if needs_growth {
            let new_capacity_paths = n_paths.max(self.capacity_paths * 2);
            let new_capacity_steps = n_steps.max(self.capacity_steps * 2);
            let size = new_capacity_paths * new_capacity_steps;

            self.growth.resize(size, 0.0);
            self.contributions.resize(size, 0.0);
            self.balances.resize(size, 0.0);

            self.capacity_paths = new_capacity_paths;
            self.capacity_steps = new_capacity_steps;
        }

        self.size_paths = n_paths;
        self.size_steps = n_steps;
    }

    /// Clears the logical size, keeping capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.size_paths = 0;
        self.size_steps = 0;
    }

    /// Total memory held by all buffers, in bytes.
    #[inline]
    pub fn memory_usage(&self) -> usize {
        (self.growth.capacity() + self.contributions.capacity() + self.balances.capacity())
            * std::mem::size_of::<f64>()
    }

    /// Current path capacity.
    #[inline]
    pub fn capacity_paths(&self) -> usize {
        self.capacity_paths
    }

    /// Current step capacity.
    #[inline]
    pub fn capacity_steps(&self) -> usize {
        self.capacity_steps
    }

    /// Logical path count.
    #[inline]
    pub fn size_paths(&self) -> usize {
        self.size_paths
    }

    /// Logical step count.
    #[inline]
    pub fn size_steps(&self) -> usize {
        self.size_steps
    }

    #[inline]
    fn logical_len(&self) -> usize {
        self.size_paths * self.size_steps
    }

    /// Growth factors over the logical `[steps][paths]` region.
    #[inline]
    pub fn growth_mut(&mut self) -> &mut [f64] {
        let len = self.logical_len();
        &mut self.growth[..len]
    }

    /// Contributions over the logical `[steps][paths]` region.
    #[inline]
    pub fn contributions_mut(&mut self) -> &mut [f64] {
        let len = self.logical_len();
        &mut self.contributions[..len]
    }

    /// Balances over the logical `[steps][paths]` region.
    #[inline]
    pub fn balances(&self) -> &[f64] {
        &self.balances[..self.logical_len()]
    }

    /// Splits the buffers into the inputs and output of step `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= size_steps()`.
    pub fn step_buffers(&mut self, t: usize) -> StepBuffers<'_> {
        assert!(t < self.size_steps, "step {} out of range", t);
        let paths = self.size_paths;
        let row = t * paths..(t + 1) * paths;

        let (done, rest) = self.balances.split_at_mut(t * paths);
        StepBuffers {
            previous: t.checked_sub(1).map(|prev| &done[prev * paths..]),
            contributions: &self.contributions[row.clone()],
            growth: &self.growth[row],
            balances: &mut rest[..paths],
        }
    }

    /// Copies the logical balances out as a [`TimeBatch`].
    pub fn balances_batch(&self) -> Result<TimeBatch, DomainError> {
        TimeBatch::from_vec(self.size_steps, self.size_paths, self.balances().to_vec())
    }
}

impl Default for AccumulationWorkspace {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
