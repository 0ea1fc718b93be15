//! Marginal transform: uniforms to target-domain samples.
//!
//! Each output column is described by a [`ColumnSpec`] that reads one or two
//! coordinates of a uniform batch:
//!
//! - `Continuous`: quantile of a marginal applied to one coordinate
//! - `Gated`: a zero-inflated compound reading a gate coordinate and a
//!   magnitude coordinate; the gate alone decides whether the output is zero
//! - `Passthrough`: copies a coordinate unchanged
//!
//! Transforms are pure element-wise maps, parallel over paths. The first
//! out-of-range input aborts with a [`DomainError`]; nothing is clamped.

use corrsim_core::types::DomainError;
use corrsim_models::marginals::{Marginal, MarginalSpec, ZeroInflated};
use rayon::prelude::*;

use crate::batch::{SampleBatch, TimeSampleBatch};
use crate::parallel::{map_rows, CHUNK_PATHS};
use crate::rng::SimRng;

/// How one output column is produced from a uniform batch.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum ColumnSpec {
    /// Quantile of `marginal` applied to coordinate `source`.
    Continuous {
        /// Uniform coordinate read
        source: usize,
        /// Target marginal
        marginal: MarginalSpec,
    },
    /// Zero-inflated compound over two coordinates.
    Gated {
        /// Coordinate compared against the no-event probability
        gate: usize,
        /// Coordinate fed to the magnitude quantile
        magnitude: usize,
        /// Gate probability and magnitude distribution
        spec: ZeroInflated,
    },
    /// Coordinate copied unchanged.
    Passthrough {
        /// Coordinate read
        source: usize,
    },
}

impl ColumnSpec {
    /// Continuous column.
    pub fn continuous(source: usize, marginal: MarginalSpec) -> Self {
        ColumnSpec::Continuous { source, marginal }
    }

    /// Gated column.
    pub fn gated(gate: usize, magnitude: usize, spec: ZeroInflated) -> Self {
        ColumnSpec::Gated {
            gate,
            magnitude,
            spec,
        }
    }

    /// Passthrough column.
    pub fn passthrough(source: usize) -> Self {
        ColumnSpec::Passthrough { source }
    }

    /// Largest coordinate index this column reads.
    pub fn max_source(&self) -> usize {
        match self {
            ColumnSpec::Continuous { source, .. } | ColumnSpec::Passthrough { source } => *source,
            ColumnSpec::Gated {
                gate, magnitude, ..
            } => (*gate).max(*magnitude),
        }
    }

    /// Checks every coordinate read is below `dim`.
    pub fn validate(&self, dim: usize) -> Result<(), DomainError> {
        let column = self.max_source();
        if column >= dim {
            return Err(DomainError::ColumnOutOfRange { column, dim });
        }
        Ok(())
    }

    /// Transforms one row of uniforms.
    #[inline]
    pub fn apply(&self, row: &[f64]) -> Result<f64, DomainError> {
        match self {
            ColumnSpec::Continuous { source, marginal } => marginal.quantile(row[*source]),
            ColumnSpec::Gated {
                gate,
                magnitude,
                spec,
            } => spec.gated(row[*gate], row[*magnitude]),
            ColumnSpec::Passthrough { source } => Ok(row[*source]),
        }
    }
}

/// Maps a uniform batch to one column per spec.
///
/// # Errors
///
/// - `ColumnOutOfRange` if a spec reads a coordinate beyond the batch
/// - `ProbabilityOutOfRange` at the first input outside `[0, 1]`
pub fn transform(batch: &SampleBatch, specs: &[ColumnSpec]) -> Result<SampleBatch, DomainError> {
    for spec in specs {
        spec.validate(batch.dim())?;
    }

    let mut out = SampleBatch::zeros(batch.paths(), specs.len());
    map_rows::<DomainError, _>(
        batch.as_slice(),
        batch.dim(),
        out.as_mut_slice(),
        specs.len(),
        |row, out_row| {
            for (slot, spec) in out_row.iter_mut().zip(specs) {
                *slot = spec.apply(row)?;
            }
            Ok(())
        },
    )?;
    Ok(out)
}

/// Transforms a single output column.
pub fn transform_column(batch: &SampleBatch, spec: &ColumnSpec) -> Result<Vec<f64>, DomainError> {
    spec.validate(batch.dim())?;
    batch
        .as_slice()
        .par_chunks(batch.dim())
        .with_min_len(CHUNK_PATHS)
        .map(|row| spec.apply(row))
        .collect()
}

/// Applies one marginal's quantile to every value of the batch.
pub fn apply_marginal<M>(batch: &SampleBatch, marginal: &M) -> Result<SampleBatch, DomainError>
where
    M: Marginal + ?Sized,
{
    let values = batch
        .as_slice()
        .par_iter()
        .with_min_len(CHUNK_PATHS)
        .map(|&u| marginal.quantile(u))
        .collect::<Result<Vec<f64>, DomainError>>()?;
    SampleBatch::from_vec(batch.paths(), batch.dim(), values)
}

/// Transforms every step of a time-indexed uniform batch.
pub fn transform_time_batch(
    batch: &TimeSampleBatch,
    specs: &[ColumnSpec],
) -> Result<TimeSampleBatch, DomainError> {
    for spec in specs {
        spec.validate(batch.dim())?;
    }

    let mut out = TimeSampleBatch::zeros(batch.steps(), batch.paths(), specs.len());
    for t in 0..batch.steps() {
        map_rows::<DomainError, _>(
            batch.step(t),
            batch.dim(),
            out.step_mut(t),
            specs.len(),
            |row, out_row| {
                for (slot, spec) in out_row.iter_mut().zip(specs) {
                    *slot = spec.apply(row)?;
                }
                Ok(())
            },
        )?;
    }
    Ok(out)
}

/// Inverse-transform sample of one value from `marginal`.
///
/// The uniform is drawn from the open interval, so unbounded supports never
/// yield an infinite sample.
#[inline]
pub fn sample_marginal<M>(marginal: &M, rng: &mut SimRng) -> Result<f64, DomainError>
where
    M: Marginal + ?Sized,
{
    marginal.quantile(rng.gen_open_uniform())
}
