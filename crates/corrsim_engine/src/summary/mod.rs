//! Reduction of a completed path ensemble to percentiles and present values.
//!
//! Everything here is deterministic: no random draws, no mutation of the
//! input ensemble.

mod discount;
mod percentile;

pub use discount::{discount, DiscountConfig, DiscountTiming};
pub use percentile::{percentiles, PercentileTable};

use corrsim_core::types::{DomainError, SimulationError};

use crate::accumulate::PathEnsemble;

/// Percentile summary of an ensemble, nominal and optionally discounted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SummaryTable {
    /// Percentile levels, in percent.
    pub levels: Vec<f64>,
    /// Per-step percentiles of nominal balances.
    pub nominal: PercentileTable,
    /// Per-step percentiles of discounted balances, when a discount was given.
    pub present_value: Option<PercentileTable>,
    /// Mean terminal balance.
    pub terminal_mean: f64,
    /// Mean discounted terminal balance.
    pub terminal_present_value_mean: Option<f64>,
    /// Number of paths summarised.
    pub paths: usize,
    /// Number of steps summarised.
    pub steps: usize,
}

/// Summarises `ensemble` at the requested percentile `levels`.
///
/// Discounting multiplies each value by a deterministic per-step factor, so
/// percentiles of the discounted batch equal the discounted percentiles.
///
/// # Errors
///
/// `Domain` for an empty ensemble or an invalid level.
///
/// # Examples
///
/// ```
/// use corrsim_engine::accumulate::PathEnsemble;
/// use corrsim_engine::batch::TimeBatch;
/// use corrsim_engine::summary::{summarize, DiscountConfig};
///
/// let ensemble = PathEnsemble::new(TimeBatch::filled(13, 100, 105.0), None);
/// let discount = DiscountConfig::monthly(0.05, 0.0).unwrap();
/// let table = summarize(&ensemble, &[5.0, 50.0, 95.0], Some(&discount)).unwrap();
///
/// assert_eq!(table.nominal.terminal(), &[105.0; 3]);
/// assert!((table.terminal_present_value_mean.unwrap() - 100.0).abs() < 1e-9);
/// ```
pub fn summarize(
    ensemble: &PathEnsemble,
    levels: &[f64],
    discount_config: Option<&DiscountConfig>,
) -> Result<SummaryTable, SimulationError> {
    let balances = ensemble.balances();
    let nominal = PercentileTable::from_batch(balances, levels)?;
    let terminal_mean = mean(ensemble.terminal())?;

    let (present_value, terminal_present_value_mean) = match discount_config {
        Some(config) => {
            let discounted = discount(balances, config);
            let table = PercentileTable::from_batch(&discounted, levels)?;
            let pv_mean = mean(discounted.terminal())?;
            (Some(table), Some(pv_mean))
        }
        None => (None, None),
    };

    Ok(SummaryTable {
        levels: levels.to_vec(),
        nominal,
        present_value,
        terminal_mean,
        terminal_present_value_mean,
        paths: ensemble.paths(),
        steps: ensemble.steps(),
    })
}

fn mean(values: &[f64]) -> Result<f64, DomainError> {
    if values.is_empty() {
        return Err(DomainError::EmptyInput { what: "mean" });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::TimeBatch;
    use approx::assert_relative_eq;

    fn ensemble() -> PathEnsemble {
        // Step t, path p holds (t + 1) × (p + 1).
        let rows: Vec<Vec<f64>> = (0..12)
            .map(|t| (0..5).map(|p| ((t + 1) * (p + 1)) as f64).collect())
            .collect();
        PathEnsemble::new(TimeBatch::from_rows(&rows).unwrap(), Some(1))
    }

    #[test]
    fn test_summarize_nominal_only() {
        let table = summarize(&ensemble(), &[0.0, 50.0, 100.0], None).unwrap();
        assert_eq!(table.steps, 12);
        assert_eq!(table.paths, 5);
        assert_eq!(table.nominal.row(0), &[1.0, 3.0, 5.0]);
        assert_eq!(table.nominal.terminal(), &[12.0, 36.0, 60.0]);
        assert_relative_eq!(table.terminal_mean, 36.0);
        assert!(table.present_value.is_none());
        assert!(table.terminal_present_value_mean.is_none());
    }

    #[test]
    fn test_discounted_percentiles_scale() {
        let config = DiscountConfig::monthly(0.06, 0.01).unwrap();
        let table = summarize(&ensemble(), &[25.0, 75.0], Some(&config)).unwrap();
        let pv = table.present_value.as_ref().unwrap();
        for t in 0..12 {
            for (n, d) in table.nominal.row(t).iter().zip(pv.row(t)) {
                assert_relative_eq!(n * config.factor(t), *d, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_summarize_errors() {
        let empty = PathEnsemble::new(TimeBatch::zeros(3, 0), None);
        assert!(matches!(
            summarize(&empty, &[50.0], None),
            Err(SimulationError::Domain(DomainError::EmptyInput { .. }))
        ));
        assert!(matches!(
            summarize(&ensemble(), &[150.0], None),
            Err(SimulationError::Domain(DomainError::InvalidPercentile { .. }))
        ));
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_summary_serialises() {
            let table = summarize(&ensemble(), &[50.0], None).unwrap();
            let json = serde_json::to_value(&table).unwrap();
            assert_eq!(json["paths"], 5);
            assert_eq!(json["nominal"]["levels"][0], 50.0);
            assert!(json["present_value"].is_null());
        }
    }
}
