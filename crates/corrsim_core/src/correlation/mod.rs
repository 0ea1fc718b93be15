//! Validated correlation structure and its Cholesky factor.
//!
//! ## Mathematical Background
//!
//! Given `n` independent standard normals `Z = [Z1, ..., Zn]`, correlated
//! normals are obtained as
//!
//! ```text
//! W = L * Z
//! ```
//!
//! where `L` is the lower triangular factor with `C = L * L^T`. The
//! factorisation here accepts positive *semi*-definite matrices: a zero pivot
//! (for example at `rho = 1` or `rho = -1`) yields a zero diagonal entry
//! instead of an error, provided the entries below it are consistent with a
//! zero pivot. A pivot that is negative beyond tolerance means the matrix is
//! not PSD and construction fails.
//!
//! ## Usage
//!
//! ```
//! use corrsim_core::correlation::CorrelationStructure;
//!
//! // Perfect negative correlation is singular but valid.
//! let structure = CorrelationStructure::build(2, &[1.0, -1.0, -1.0, 1.0]).unwrap();
//! assert!(structure.is_singular());
//!
//! let w = structure.cholesky().transform(&[0.7, 0.3]);
//! assert!((w[1] + 0.7).abs() < 1e-12);
//! ```

use tracing::{debug, warn};

use crate::types::CorrelationError;

/// Tolerance for the unit diagonal and symmetry checks.
const ENTRY_TOLERANCE: f64 = 1e-10;

/// Tolerance below which a Cholesky pivot is treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Tolerance on entries below a zero pivot.
const SINGULAR_COLUMN_TOLERANCE: f64 = 1e-8;

/// Correlation matrix with validation and a precomputed Cholesky factor.
///
/// A correlation structure satisfies:
/// - Square and symmetric
/// - Diagonal elements equal to 1.0
/// - Off-diagonal elements in [-1, 1]
/// - Positive semi-definite
///
/// Immutable after construction and safe to share across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationStructure {
    /// Matrix elements in row-major order
    data: Vec<f64>,
    /// Matrix dimension (n x n)
    dim: usize,
    /// Lower triangular factor
    cholesky: CholeskyFactor,
    /// At least one pivot was zero
    singular: bool,
}

impl CorrelationStructure {
    /// Builds a correlation structure from a full row-major matrix.
    ///
    /// # Arguments
    ///
    /// * `dim` - Matrix dimension (n)
    /// * `entries` - Matrix elements in row-major order (n*n elements)
    ///
    /// # Errors
    ///
    /// - `Empty` if `dim == 0`
    /// - `InvalidDimensions` if `entries.len() != dim * dim`
    /// - `NonFinite`, `InvalidDiagonal`, `NotSymmetric`, `OutOfRange` for malformed entries
    /// - `NotPositiveSemiDefinite` if the Cholesky factorisation fails
    pub fn build(dim: usize, entries: &[f64]) -> Result<Self, CorrelationError> {
        if dim == 0 {
            return Err(CorrelationError::Empty);
        }
        let expected = dim * dim;
        if entries.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: entries.len(),
            });
        }

        validate_entries(entries, dim)?;
        let (cholesky, singular) = CholeskyFactor::factorise(entries, dim)?;

        if singular {
            warn!(dim, "correlation matrix is singular; some factors are exactly collinear");
        }
        debug!(dim, singular, "built correlation structure");

        Ok(Self {
            data: entries.to_vec(),
            dim,
            cholesky,
            singular,
        })
    }

    /// Builds a correlation structure from the strictly upper triangle.
    ///
    /// `upper` lists `C[0][1], C[0][2], ..., C[0][n-1], C[1][2], ...` in row
    /// order: `n * (n - 1) / 2` values. The diagonal is implicitly 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use corrsim_core::correlation::CorrelationStructure;
    ///
    /// let s = CorrelationStructure::from_upper_triangle(3, &[0.6, 0.0, 0.0]).unwrap();
    /// assert_eq!(s.get(1, 0), 0.6);
    /// assert_eq!(s.get(2, 2), 1.0);
    /// ```
    pub fn from_upper_triangle(dim: usize, upper: &[f64]) -> Result<Self, CorrelationError> {
        if dim == 0 {
            return Err(CorrelationError::Empty);
        }
        let expected = dim * (dim - 1) / 2;
        if upper.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: upper.len(),
            });
        }

        let mut entries = vec![0.0; dim * dim];
        let mut values = upper.iter();
        for i in 0..dim {
            entries[i * dim + i] = 1.0;
            for j in (i + 1)..dim {
                if let Some(&v) = values.next() {
                    entries[i * dim + j] = v;
                    entries[j * dim + i] = v;
                }
            }
        }

        Self::build(dim, &entries)
    }

    /// Builds a correlation structure from nested rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, CorrelationError> {
        let dim = rows.len();
        let mut entries = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(CorrelationError::InvalidDimensions {
                    expected: dim * dim,
                    got: rows.iter().map(Vec::len).sum(),
                });
            }
            entries.extend_from_slice(row);
        }
        Self::build(dim, &entries)
    }

    /// Identity correlation (independent factors).
    pub fn identity(dim: usize) -> Result<Self, CorrelationError> {
        let mut entries = vec![0.0; dim * dim];
        for i in 0..dim {
            entries[i * dim + i] = 1.0;
        }
        Self::build(dim, &entries)
    }

    /// Get matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Row-major matrix entries.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Lower triangular Cholesky factor.
    #[inline]
    pub fn cholesky(&self) -> &CholeskyFactor {
        &self.cholesky
    }

    /// True when the matrix is PSD but not positive definite.
    #[inline]
    pub fn is_singular(&self) -> bool {
        self.singular
    }
}

fn validate_entries(entries: &[f64], dim: usize) -> Result<(), CorrelationError> {
    for i in 0..dim {
        for j in 0..dim {
            if !entries[i * dim + j].is_finite() {
                return Err(CorrelationError::NonFinite { i, j });
            }
        }
    }

    for i in 0..dim {
        let diag = entries[i * dim + i];
        if (diag - 1.0).abs() > ENTRY_TOLERANCE {
            return Err(CorrelationError::InvalidDiagonal {
                index: i,
                value: diag,
            });
        }
    }

    for i in 0..dim {
        for j in (i + 1)..dim {
            let upper = entries[i * dim + j];
            let lower = entries[j * dim + i];

            if (upper - lower).abs() > ENTRY_TOLERANCE {
                return Err(CorrelationError::NotSymmetric { i, j, upper, lower });
            }

            if !(-1.0..=1.0).contains(&upper) {
                return Err(CorrelationError::OutOfRange { i, j, value: upper });
            }
        }
    }

    Ok(())
}

/// Lower triangular Cholesky factor of a correlation matrix.
///
/// Used to transform independent standard normals into correlated normals.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor {
    /// Lower triangular matrix elements (row-major)
    data: Vec<f64>,
    /// Matrix dimension
    dim: usize,
}

impl CholeskyFactor {
    /// PSD-tolerant factorisation. Returns the factor and whether any pivot was zero.
    fn factorise(entries: &[f64], n: usize) -> Result<(Self, bool), CorrelationError> {
        let mut lower = vec![0.0; n * n];
        let mut singular = false;

        for j in 0..n {
            let sum: f64 = (0..j).map(|k| lower[j * n + k] * lower[j * n + k]).sum();
            let pivot = entries[j * n + j] - sum;

            if pivot < -PIVOT_TOLERANCE {
                return Err(CorrelationError::NotPositiveSemiDefinite { pivot: j, value: pivot });
            }

            let l_jj = if pivot > PIVOT_TOLERANCE {
                pivot.sqrt()
            } else {
                singular = true;
                0.0
            };
            lower[j * n + j] = l_jj;

            for i in (j + 1)..n {
                let sum: f64 = (0..j).map(|k| lower[i * n + k] * lower[j * n + k]).sum();
                let numerator = entries[i * n + j] - sum;

                if l_jj > 0.0 {
                    lower[i * n + j] = numerator / l_jj;
                } else if numerator.abs() > SINGULAR_COLUMN_TOLERANCE {
                    // Zero pivot with a non-zero entry below it: the trailing
                    // block would need a negative pivot.
                    return Err(CorrelationError::NotPositiveSemiDefinite {
                        pivot: j,
                        value: pivot,
                    });
                }
            }
        }

        Ok((Self { data: lower, dim: n }, singular))
    }

    /// Get matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    ///
    /// Returns zero for upper triangular elements (j > i).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Writes `L * z` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `z` or `out` is shorter than `self.dim()`.
    #[inline]
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        let n = self.dim;
        assert!(
            z.len() >= n && out.len() >= n,
            "Input/output length ({}, {}) is less than matrix dimension {}",
            z.len(),
            out.len(),
            n
        );

        for i in 0..n {
            let row = &self.data[i * n..i * n + i + 1];
            out[i] = row.iter().zip(z).map(|(l, zj)| l * zj).sum();
        }
    }

    /// Transform independent standard normals to correlated normals.
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()`.
    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        let mut w = vec![0.0; self.dim];
        self.transform_into(z, &mut w);
        w
    }
}
