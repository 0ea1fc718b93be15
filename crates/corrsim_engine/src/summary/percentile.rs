//! Percentiles by linear interpolation between order statistics.

use rayon::prelude::*;

use corrsim_core::types::DomainError;

use crate::batch::TimeBatch;

/// Percentiles of `values` at each level in `levels` (percent, `[0, 100]`).
///
/// Level `q` is read at rank `q / 100 × (n − 1)` of the sorted values,
/// interpolating linearly between neighbouring order statistics.
///
/// # Errors
///
/// - `EmptyInput` if `values` is empty
/// - `InvalidPercentile` for a level outside `[0, 100]` or NaN
///
/// # Examples
///
/// ```
/// use corrsim_engine::summary::percentiles;
///
/// let p = percentiles(&[4.0, 1.0, 3.0, 2.0], &[0.0, 50.0, 100.0]).unwrap();
/// assert_eq!(p, vec![1.0, 2.5, 4.0]);
/// ```
pub fn percentiles(values: &[f64], levels: &[f64]) -> Result<Vec<f64>, DomainError> {
    validate_levels(levels)?;
    if values.is_empty() {
        return Err(DomainError::EmptyInput { what: "percentiles" });
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Ok(levels.iter().map(|&q| interpolate(&sorted, q)).collect())
}

fn validate_levels(levels: &[f64]) -> Result<(), DomainError> {
    match levels.iter().find(|q| !(0.0..=100.0).contains(*q)) {
        Some(&level) => Err(DomainError::InvalidPercentile { level }),
        None => Ok(()),
    }
}

/// Reads level `q` from non-empty sorted values.
fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + weight * (sorted[upper] - sorted[lower])
    }
}

/// Per-step percentiles of a time batch.
///
/// # Examples
///
/// ```
/// use corrsim_engine::batch::TimeBatch;
/// use corrsim_engine::summary::PercentileTable;
///
/// let batch = TimeBatch::from_vec(2, 3, vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]).unwrap();
/// let table = PercentileTable::from_batch(&batch, &[50.0]).unwrap();
/// assert_eq!(table.level_series(0), vec![2.0, 20.0]);
/// assert_eq!(table.terminal(), &[20.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PercentileTable {
    levels: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl PercentileTable {
    /// Computes percentiles independently for every step, in parallel.
    ///
    /// # Errors
    ///
    /// As [`percentiles`]; a batch with steps but no paths is `EmptyInput`.
    pub fn from_batch(batch: &TimeBatch, levels: &[f64]) -> Result<Self, DomainError> {
        validate_levels(levels)?;
        let rows = (0..batch.steps())
            .into_par_iter()
            .map(|t| percentiles(batch.row(t), levels))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            levels: levels.to_vec(),
            rows,
        })
    }

    /// Requested levels, in percent.
    #[inline]
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Number of steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.rows.len()
    }

    /// Percentiles at `step`, one per level.
    #[inline]
    pub fn row(&self, step: usize) -> &[f64] {
        &self.rows[step]
    }

    /// Percentiles at the last step; empty for a zero-step batch.
    pub fn terminal(&self) -> &[f64] {
        self.rows.last().map_or(&[][..], Vec::as_slice)
    }

    /// The series of level index `level` across all steps.
    pub fn level_series(&self, level: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[level]).collect()
    }
}
