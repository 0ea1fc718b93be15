//! Annual-to-periodic rate conversions.
//!
//! Compounding uses a geometric per-period factor `(1 + r)^(1/p)`; discounting
//! uses the matching continuously-compounded periodic rate `ln(1 + r) / p`, so
//! that `exp(periodic_log_rate(r, p)) == periodic_growth_factor(r, p)`.

use crate::types::DistributionError;

fn validate(annual_rate: f64, periods_per_year: u32) -> Result<(), DistributionError> {
    if !annual_rate.is_finite() || annual_rate <= -1.0 {
        return Err(DistributionError::InvalidParameter {
            name: "annual_rate",
            value: annual_rate,
            reason: "must be finite and greater than -1".to_string(),
        });
    }
    if periods_per_year == 0 {
        return Err(DistributionError::InvalidParameter {
            name: "periods_per_year",
            value: 0.0,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Per-period growth factor for an annual rate compounded `periods_per_year`
/// times a year.
///
/// # Examples
/// ```
/// use corrsim_core::math::periodic_growth_factor;
///
/// let g = periodic_growth_factor(0.08, 12).unwrap();
/// assert!((g.powi(12) - 1.08).abs() < 1e-12);
/// ```
pub fn periodic_growth_factor(annual_rate: f64, periods_per_year: u32) -> Result<f64, DistributionError> {
    validate(annual_rate, periods_per_year)?;
    Ok((1.0 + annual_rate).powf(1.0 / f64::from(periods_per_year)))
}

/// Continuously-compounded periodic rate `ln(1 + r) / p`.
pub fn periodic_log_rate(annual_rate: f64, periods_per_year: u32) -> Result<f64, DistributionError> {
    validate(annual_rate, periods_per_year)?;
    Ok(annual_rate.ln_1p() / f64::from(periods_per_year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_factor_monthly() {
        let g = periodic_growth_factor(0.08, 12).unwrap();
        assert_relative_eq!(g, 1.006_434_030_110_004, epsilon = 1e-12);
    }

    #[test]
    fn test_growth_factor_zero_rate() {
        assert_relative_eq!(periodic_growth_factor(0.0, 12).unwrap(), 1.0);
        assert_relative_eq!(periodic_log_rate(0.0, 12).unwrap(), 0.0);
    }

    #[test]
    fn test_log_rate_matches_growth_factor() {
        for r in [-0.5, -0.02, 0.03, 0.08, 0.25] {
            let g = periodic_growth_factor(r, 12).unwrap();
            let m = periodic_log_rate(r, 12).unwrap();
            assert_relative_eq!(m.exp(), g, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(matches!(
            periodic_growth_factor(-1.0, 12),
            Err(DistributionError::InvalidParameter { name: "annual_rate", .. })
        ));
        assert!(periodic_log_rate(f64::NAN, 12).is_err());
        assert!(matches!(
            periodic_growth_factor(0.05, 0),
            Err(DistributionError::InvalidParameter { name: "periods_per_year", .. })
        ));
    }
}
