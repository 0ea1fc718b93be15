//! One-dimensional distribution checks: KS uniformity, histograms, densities.

use std::collections::BTreeMap;

use corrsim_core::types::DomainError;
use corrsim_models::marginals::Marginal;

/// Kolmogorov–Smirnov statistic of `values` against the uniform CDF on
/// `[0, 1]`.
///
/// # Errors
///
/// `EmptyInput` if `values` is empty.
///
/// # Examples
///
/// ```
/// use corrsim_engine::diagnostics::ks_statistic_uniform;
///
/// let d = ks_statistic_uniform(&[0.1, 0.3, 0.5, 0.7, 0.9]).unwrap();
/// assert!((d - 0.1).abs() < 1e-12);
/// ```
pub fn ks_statistic_uniform(values: &[f64]) -> Result<f64, DomainError> {
    if values.is_empty() {
        return Err(DomainError::EmptyInput {
            what: "a KS statistic",
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let n = sorted.len() as f64;

    let d = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let cdf = x.clamp(0.0, 1.0);
            let above = (i + 1) as f64 / n - cdf;
            let below = cdf - i as f64 / n;
            above.max(below)
        })
        .fold(0.0_f64, f64::max);
    Ok(d)
}

/// Asymptotic KS critical value `c(α) / √n` with `c(α) = √(−ln(α/2) / 2)`.
///
/// The uniformity hypothesis is rejected at level `alpha` when the statistic
/// exceeds this value.
pub fn ks_critical_value(n: usize, alpha: f64) -> f64 {
    (-(alpha / 2.0).ln() / 2.0).sqrt() / (n as f64).sqrt()
}

/// Counts of values per integer bin, keyed by `round(x)`.
///
/// Non-finite values are skipped.
pub fn unit_histogram(values: &[f64]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &x in values.iter().filter(|x| x.is_finite()) {
        *counts.entry(x.round() as i64).or_insert(0) += 1;
    }
    counts
}

/// Fraction of values exactly equal to zero; `0.0` for empty input.
pub fn zero_fraction(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&x| x == 0.0).count() as f64 / values.len() as f64
}

/// `(x, pdf(x))` pairs on `points` evenly spaced abscissae over `[lo, hi]`.
///
/// # Examples
///
/// ```
/// use corrsim_engine::diagnostics::density_grid;
/// use corrsim_models::marginals::Parametric;
///
/// let uniform = Parametric::uniform(0.0, 2.0).unwrap();
/// let grid = density_grid(&uniform, 0.5, 1.5, 3);
/// assert_eq!(grid, vec![(0.5, 0.5), (1.0, 0.5), (1.5, 0.5)]);
/// ```
pub fn density_grid<M>(marginal: &M, lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)>
where
    M: Marginal + ?Sized,
{
    match points {
        0 => Vec::new(),
        1 => vec![(lo, marginal.pdf(lo))],
        n => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let x = if i == n - 1 { hi } else { lo + i as f64 * step };
                    (x, marginal.pdf(x))
                })
                .collect()
        }
    }
}
