//! Reduction of a time batch along the time axis.
//!
//! Turns fine-grained per-step values into coarser periods, for example
//! daily gated expense draws into monthly totals that feed the accumulator as
//! precomputed contributions. Window lengths are either fixed or supplied per
//! period (see [`corrsim_core::types::month_windows`] for calendar months).
//!
//! # Examples
//!
//! ```
//! use corrsim_engine::aggregate::{reduce_along_time, Reduction, Window};
//! use corrsim_engine::batch::TimeBatch;
//!
//! // 5 daily steps, 1 path.
//! let daily = TimeBatch::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//!
//! let totals = reduce_along_time(&daily, &Window::Lengths(vec![2, 3]), Reduction::Sum).unwrap();
//! assert_eq!(totals.as_slice(), &[3.0, 12.0]);
//!
//! let pairs = reduce_along_time(&daily, &Window::Fixed(2), Reduction::Max).unwrap();
//! assert_eq!(pairs.as_slice(), &[2.0, 4.0, 5.0]);
//! ```

use rayon::prelude::*;

use corrsim_core::types::DomainError;

use crate::batch::TimeBatch;
use crate::parallel::CHUNK_PATHS;

/// Grouping of consecutive steps into output periods.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Window {
    /// Windows of `n` steps; a trailing partial window is kept.
    Fixed(usize),
    /// Explicit window lengths, which must sum to the step count.
    Lengths(Vec<usize>),
}

impl Window {
    /// Resolves the window lengths for a batch of `steps` steps.
    ///
    /// # Errors
    ///
    /// - `EmptyWindow` for a zero-length window
    /// - `ShapeMismatch` if explicit lengths do not sum to `steps`
    pub fn lengths(&self, steps: usize) -> Result<Vec<usize>, DomainError> {
        match self {
            Window::Fixed(0) => Err(DomainError::EmptyWindow { index: 0 }),
            Window::Fixed(n) => {
                let full = steps / n;
                let mut lengths = vec![*n; full];
                if steps % n != 0 {
                    lengths.push(steps % n);
                }
                Ok(lengths)
            }
            Window::Lengths(lengths) => {
                if let Some(index) = lengths.iter().position(|&len| len == 0) {
                    return Err(DomainError::EmptyWindow { index });
                }
                let total: usize = lengths.iter().sum();
                if total != steps {
                    return Err(DomainError::ShapeMismatch {
                        what: "window lengths",
                        expected: steps,
                        got: total,
                    });
                }
                Ok(lengths.clone())
            }
        }
    }
}

/// Per-path reduction applied within each window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Reduction {
    /// Sum of the window's values.
    #[default]
    Sum,
    /// Arithmetic mean of the window's values.
    Mean,
    /// Largest value in the window.
    Max,
    /// Smallest value in the window.
    Min,
}

impl Reduction {
    fn combine(self, acc: f64, x: f64) -> f64 {
        match self {
            Reduction::Sum | Reduction::Mean => acc + x,
            Reduction::Max => acc.max(x),
            Reduction::Min => acc.min(x),
        }
    }

    fn finish(self, acc: f64, len: usize) -> f64 {
        match self {
            Reduction::Mean => acc / len as f64,
            _ => acc,
        }
    }
}

/// Reduces `batch` along time, one output step per window.
///
/// The output has shape `[windows][paths]`.
///
/// # Errors
///
/// See [`Window::lengths`].
pub fn reduce_along_time(
    batch: &TimeBatch,
    window: &Window,
    reduction: Reduction,
) -> Result<TimeBatch, DomainError> {
    let lengths = window.lengths(batch.steps())?;
    let paths = batch.paths();
    let mut out = TimeBatch::zeros(lengths.len(), paths);

    let mut start = 0;
    for (w, &len) in lengths.iter().enumerate() {
        let out_row = out.row_mut(w);
        out_row.copy_from_slice(batch.row(start));
        for t in start + 1..start + len {
            let row = batch.row(t);
            out_row
                .par_iter_mut()
                .zip(row.par_iter())
                .with_min_len(CHUNK_PATHS)
                .for_each(|(acc, &x)| *acc = reduction.combine(*acc, x));
        }
        if reduction == Reduction::Mean {
            out_row.iter_mut().for_each(|acc| *acc = reduction.finish(*acc, len));
        }
        start += len;
    }

    Ok(out)
}
