use corrsim_core::types::DomainError;

use super::TimeBatch;

/// Rectangular batch of draws with shape `(paths, dim)`.
///
/// # Examples
///
/// ```
/// use corrsim_engine::batch::SampleBatch;
///
/// let batch = SampleBatch::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(batch.row(1), &[4.0, 5.0, 6.0]);
/// assert_eq!(batch.column(2).unwrap(), vec![3.0, 6.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBatch {
    data: Vec<f64>,
    paths: usize,
    dim: usize,
}

impl SampleBatch {
    /// Zero-filled batch.
    pub fn zeros(paths: usize, dim: usize) -> Self {
        Self {
            data: vec![0.0; paths * dim],
            paths,
            dim,
        }
    }

    /// Wraps row-major `data`.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `data.len() != paths * dim`.
    pub fn from_vec(paths: usize, dim: usize, data: Vec<f64>) -> Result<Self, DomainError> {
        if data.len() != paths * dim {
            return Err(DomainError::ShapeMismatch {
                what: "sample batch",
                expected: paths * dim,
                got: data.len(),
            });
        }
        Ok(Self { data, paths, dim })
    }

    /// Number of paths (rows).
    #[inline]
    pub fn paths(&self) -> usize {
        self.paths
    }

    /// Number of coordinates per path.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Value at (path, coordinate).
    #[inline]
    pub fn get(&self, path: usize, column: usize) -> f64 {
        self.data[path * self.dim + column]
    }

    /// All coordinates of one path.
    #[inline]
    pub fn row(&self, path: usize) -> &[f64] {
        &self.data[path * self.dim..(path + 1) * self.dim]
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.paths).map(move |p| self.row(p))
    }

    /// Copies one coordinate across all paths.
    ///
    /// # Errors
    ///
    /// `ColumnOutOfRange` if `column >= dim`.
    pub fn column(&self, column: usize) -> Result<Vec<f64>, DomainError> {
        if column >= self.dim {
            return Err(DomainError::ColumnOutOfRange {
                column,
                dim: self.dim,
            });
        }
        Ok(self.rows().map(|row| row[column]).collect())
    }

    /// Row-major values.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major values.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consumes the batch, returning its row-major values.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// Time-indexed batch of draws with shape `(time_steps, paths, dim)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSampleBatch {
    data: Vec<f64>,
    steps: usize,
    paths: usize,
    dim: usize,
}

impl TimeSampleBatch {
    /// Zero-filled batch.
    pub fn zeros(steps: usize, paths: usize, dim: usize) -> Self {
        Self {
            data: vec![0.0; steps * paths * dim],
            steps,
            paths,
            dim,
        }
    }

    /// Stacks per-step batches.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the batches do not all share one `(paths, dim)` shape.
    pub fn from_steps(batches: Vec<SampleBatch>) -> Result<Self, DomainError> {
        let steps = batches.len();
        let (paths, dim) = batches.first().map_or((0, 0), |b| (b.paths, b.dim));
        let mut data = Vec::with_capacity(steps * paths * dim);

        for batch in batches {
            if batch.paths != paths || batch.dim != dim {
                return Err(DomainError::ShapeMismatch {
                    what: "time step batch",
                    expected: paths * dim,
                    got: batch.paths * batch.dim,
                });
            }
            data.extend_from_slice(&batch.data);
        }

        Ok(Self {
            data,
            steps,
            paths,
            dim,
        })
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

    /// Number of coordinates.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Value at (step, path, coordinate).
    #[inline]
    pub fn get(&self, step: usize, path: usize, column: usize) -> f64 {
        self.data[(step * self.paths + path) * self.dim + column]
    }

    /// Row-major `(paths, dim)` values of one step.
    #[inline]
    pub fn step(&self, step: usize) -> &[f64] {
        let len = self.paths * self.dim;
        &self.data[step * len..(step + 1) * len]
    }

    /// Mutable values of one step.
    #[inline]
    pub fn step_mut(&mut self, step: usize) -> &mut [f64] {
        let len = self.paths * self.dim;
        &mut self.data[step * len..(step + 1) * len]
    }

    /// Extracts one coordinate as a `[steps][paths]` time batch.
    ///
    /// # Errors
    ///
    /// `ColumnOutOfRange` if `column >= dim`.
    pub fn column(&self, column: usize) -> Result<TimeBatch, DomainError> {
        if column >= self.dim {
            return Err(DomainError::ColumnOutOfRange {
                column,
                dim: self.dim,
            });
        }
        let values = self
            .data
            .iter()
            .skip(column)
            .step_by(self.dim)
            .copied()
            .collect();
        TimeBatch::from_vec(self.steps, self.paths, values)
    }
}
