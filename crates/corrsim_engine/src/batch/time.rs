use corrsim_core::types::DomainError;

/// Scalar values on a `[time_steps][paths]` grid.
///
/// Rows are time steps, so one step's values across all paths are
/// contiguous; the accumulator writes row `t` only after row `t − 1` is
/// complete.
///
/// # Examples
///
/// ```
/// use corrsim_engine::batch::TimeBatch;
///
/// let batch = TimeBatch::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(batch.row(1), &[4.0, 5.0, 6.0]);
/// assert_eq!(batch.path(2), vec![3.0, 6.0]);
/// assert_eq!(batch.terminal(), &[4.0, 5.0, 6.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TimeBatch {
    data: Vec<f64>,
    steps: usize,
    paths: usize,
}

impl TimeBatch {
    /// Zero-filled batch.
    pub fn zeros(steps: usize, paths: usize) -> Self {
        Self::filled(steps, paths, 0.0)
    }

    /// Batch with every entry equal to `value`.
    pub fn filled(steps: usize, paths: usize, value: f64) -> Self {
        Self {
            data: vec![value; steps * paths],
            steps,
            paths,
        }
    }

    /// Wraps step-major `data`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `data.len() != steps * paths`.
    pub fn from_vec(steps: usize, paths: usize, data: Vec<f64>) -> Result<Self, DomainError> {
        if data.len() != steps * paths {
            return Err(DomainError::ShapeMismatch {
                what: "time batch",
                expected: steps * paths,
                got: data.len(),
            });
        }
        Ok(Self { data, steps, paths })
    }

    /// Builds a batch from one row per step.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if rows differ in length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, DomainError> {
        let steps = rows.len();
        let paths = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(steps * paths);
        for row in rows {
            if row.len() != paths {
                return Err(DomainError::ShapeMismatch {
                    what: "time batch row",
                    expected: paths,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, steps, paths })
    }

    /// Number of time steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of paths.
    #[inline]
    pub fn paths(&self) -> usize {
        self.paths
    }

    /// Value at (step, path).
    #[inline]
    pub fn get(&self, step: usize, path: usize) -> f64 {
        self.data[step * self.paths + path]
    }

    /// Values of all paths at one step.
    #[inline]
    pub fn row(&self, step: usize) -> &[f64] {
        &self.data[step * self.paths..(step + 1) * self.paths]
    }

    /// Mutable values of all paths at one step.
    #[inline]
    pub fn row_mut(&mut self, step: usize) -> &mut [f64] {
        &mut self.data[step * self.paths..(step + 1) * self.paths]
    }

    /// Iterates over step rows in time order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.steps).map(move |t| self.row(t))
    }

    /// Trajectory of one path through time.
    pub fn path(&self, path: usize) -> Vec<f64> {
        (0..self.steps).map(|t| self.get(t, path)).collect()
    }

    /// Values at the last step; empty if the batch has no steps.
    #[inline]
    pub fn terminal(&self) -> &[f64] {
        match self.steps {
            0 => &[],
            n => self.row(n - 1),
        }
    }

    /// Applies `f(step, value)` to every entry.
    pub fn map_with_step<F>(&self, f: F) -> TimeBatch
    where
        F: Fn(usize, f64) -> f64,
    {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| f(i / self.paths.max(1), v))
            .collect();
        TimeBatch {
            data,
            steps: self.steps,
            paths: self.paths,
        }
    }

    /// Step-major values.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable step-major values.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consumes the batch, returning its step-major values.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}
