//! The single stepping primitive shared by every accumulation mode.

use rayon::prelude::*;

use corrsim_core::types::DomainError;

use crate::parallel::{ParallelConfig, CHUNK_PATHS};

/// Advances every path by one step: `out[p] = (prev[p] + c[p]) × g[p]`.
///
/// `prev` is `None` at `t = 0`, where the prior balance is zero. Paths are
/// independent and processed in parallel for large batches.
///
/// # Errors
///
/// `ShapeMismatch` if the slices differ in length.
///
/// # Examples
///
/// ```
/// use corrsim_engine::accumulate::advance_step;
///
/// let mut out = [0.0; 2];
/// advance_step(Some(&[100.0, 200.0]), &[10.0, 0.0], &[1.1, 0.5], &mut out).unwrap();
/// assert!((out[0] - 121.0).abs() < 1e-12);
/// assert_eq!(out[1], 100.0);
/// ```
pub fn advance_step(
    prev: Option<&[f64]>,
    contributions: &[f64],
    growth: &[f64],
    out: &mut [f64],
) -> Result<(), DomainError> {
    let paths = out.len();
    check_len("contributions", paths, contributions.len())?;
    check_len("growth factors", paths, growth.len())?;

    let parallel = ParallelConfig::default().should_parallelise(paths);
    match prev {
        Some(prev) => {
            check_len("previous balances", paths, prev.len())?;
            let step = |((b, &p), (&c, &g)): ((&mut f64, &f64), (&f64, &f64))| *b = (p + c) * g;
            if parallel {
                out.par_iter_mut()
                    .zip(prev.par_iter())
                    .zip(contributions.par_iter().zip(growth.par_iter()))
                    .with_min_len(CHUNK_PATHS)
                    .for_each(step);
            } else {
                out.iter_mut()
                    .zip(prev)
                    .zip(contributions.iter().zip(growth))
                    .for_each(step);
            }
        }
        None => {
            let step = |(b, (&c, &g)): (&mut f64, (&f64, &f64))| *b = c * g;
            if parallel {
                out.par_iter_mut()
                    .zip(contributions.par_iter().zip(growth.par_iter()))
                    .with_min_len(CHUNK_PATHS)
                    .for_each(step);
            } else {
                out.iter_mut()
                    .zip(contributions.iter().zip(growth))
                    .for_each(step);
            }
        }
    }
    Ok(())
}

#[inline]
fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), DomainError> {
    if expected == got {
        Ok(())
    } else {
        Err(DomainError::ShapeMismatch {
            what,
            expected,
            got,
        })
    }
}
