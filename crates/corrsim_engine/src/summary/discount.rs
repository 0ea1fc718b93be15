//! Present-value discounting of a time batch.

use corrsim_core::math::periodic_log_rate;
use corrsim_core::types::DistributionError;

use crate::batch::TimeBatch;

/// Number of elapsed periods attributed to step `t`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DiscountTiming {
    /// Step `t` is discounted over `t` periods; step 0 is undiscounted.
    #[default]
    StartOfPeriod,
    /// Step `t` closes period `t + 1` and is discounted over `t + 1` periods.
    EndOfPeriod,
}

impl DiscountTiming {
    #[inline]
    fn elapsed(self, step: usize) -> f64 {
        match self {
            DiscountTiming::StartOfPeriod => step as f64,
            DiscountTiming::EndOfPeriod => (step + 1) as f64,
        }
    }
}

/// Deterministic discount and inflation rates.
///
/// Annual rates convert to periodic log rates `m = ln(1 + r) / p`, the same
/// convention as deterministic growth. With the default timing step `t` is
/// multiplied by `exp(−t·m_discount) × exp(t·m_inflation)`.
///
/// # Examples
///
/// ```
/// use corrsim_engine::summary::{DiscountConfig, DiscountTiming};
///
/// let config = DiscountConfig::monthly(0.05, 0.0).unwrap();
/// assert_eq!(config.factor(0), 1.0);
/// assert!((config.factor(12) - 1.0 / 1.05).abs() < 1e-12);
///
/// let closing = config.with_timing(DiscountTiming::EndOfPeriod);
/// assert!((closing.factor(11) - 1.0 / 1.05).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscountConfig {
    annual_discount_rate: f64,
    annual_inflation_rate: f64,
    periods_per_year: u32,
    timing: DiscountTiming,
    /// `m_inflation − m_discount`.
    net_log_rate: f64,
}

impl DiscountConfig {
    /// Creates a discount configuration.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a rate `<= -1`, a non-finite rate, or zero
    /// periods per year.
    pub fn new(
        annual_discount_rate: f64,
        annual_inflation_rate: f64,
        periods_per_year: u32,
    ) -> Result<Self, DistributionError> {
        let m_discount = periodic_log_rate(annual_discount_rate, periods_per_year)?;
        let m_inflation = periodic_log_rate(annual_inflation_rate, periods_per_year)?;
        Ok(Self {
            annual_discount_rate,
            annual_inflation_rate,
            periods_per_year,
            timing: DiscountTiming::default(),
            net_log_rate: m_inflation - m_discount,
        })
    }

    /// Monthly steps.
    pub fn monthly(
        annual_discount_rate: f64,
        annual_inflation_rate: f64,
    ) -> Result<Self, DistributionError> {
        Self::new(annual_discount_rate, annual_inflation_rate, 12)
    }

    /// Annual discount rate.
    #[inline]
    pub fn annual_discount_rate(&self) -> f64 {
        self.annual_discount_rate
    }

    /// Annual inflation rate.
    #[inline]
    pub fn annual_inflation_rate(&self) -> f64 {
        self.annual_inflation_rate
    }

    /// Steps per year.
    #[inline]
    pub fn periods_per_year(&self) -> u32 {
        self.periods_per_year
    }

    /// Same rates with a different step timing.
    pub fn with_timing(mut self, timing: DiscountTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Step timing.
    #[inline]
    pub fn timing(&self) -> DiscountTiming {
        self.timing
    }

    /// Multiplicative factor applied to step `step`.
    #[inline]
    pub fn factor(&self, step: usize) -> f64 {
        (self.timing.elapsed(step) * self.net_log_rate).exp()
    }
}

/// Multiplies every value at step `t` by `config.factor(t)`.
pub fn discount(batch: &TimeBatch, config: &DiscountConfig) -> TimeBatch {
    batch.map_with_step(|t, v| v * config.factor(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_first_step_undiscounted() {
        let config = DiscountConfig::monthly(0.05, 0.0).unwrap();
        assert_eq!(config.timing(), DiscountTiming::StartOfPeriod);
        assert_eq!(config.factor(0), 1.0);

        let config = DiscountConfig::monthly(0.05, 0.02).unwrap();
        assert_eq!(config.factor(0), 1.0);
    }

    #[test]
    fn test_factor_one_year() {
        let config = DiscountConfig::monthly(0.05, 0.02).unwrap();
        assert_relative_eq!(config.factor(12), 1.02 / 1.05, max_relative = 1e-12);
        assert_relative_eq!(config.factor(24), (1.02_f64 / 1.05).powi(2), max_relative = 1e-12);
    }

    #[test]
    fn test_end_of_period_timing() {
        let config = DiscountConfig::monthly(0.05, 0.02)
            .unwrap()
            .with_timing(DiscountTiming::EndOfPeriod);
        assert_relative_eq!(config.factor(0), (1.02_f64 / 1.05).powf(1.0 / 12.0), max_relative = 1e-12);
        assert_relative_eq!(config.factor(11), 1.02 / 1.05, max_relative = 1e-12);
    }

    #[test]
    fn test_equal_rates_cancel() {
        let config = DiscountConfig::monthly(0.03, 0.03).unwrap();
        assert_eq!(config.factor(100), 1.0);
    }

    #[test]
    fn test_invalid_rates() {
        assert!(DiscountConfig::monthly(-1.0, 0.0).is_err());
        assert!(DiscountConfig::monthly(0.0, f64::NAN).is_err());
        assert!(DiscountConfig::new(0.05, 0.0, 0).is_err());
    }

    #[test]
    fn test_discount_batch() {
        let batch = TimeBatch::filled(13, 2, 105.0);
        let config = DiscountConfig::new(0.05, 0.0, 12).unwrap();
        let pv = discount(&batch, &config);
        assert_eq!(pv.get(0, 0), 105.0);
        assert!(pv.get(1, 0) < 105.0 && pv.get(1, 0) > 100.0);
        assert_relative_eq!(pv.get(12, 1), 100.0, max_relative = 1e-12);
    }

    proptest! {
        #[test]
        fn prop_zero_rates_identity(values in prop::collection::vec(-1e6f64..1e6, 1..60)) {
            let steps = values.len();
            let batch = TimeBatch::from_vec(steps, 1, values).unwrap();
            let config = DiscountConfig::monthly(0.0, 0.0).unwrap();
            prop_assert_eq!(discount(&batch, &config), batch);
        }

        #[test]
        fn prop_composes_with_identity(r in -0.5f64..0.5, i in -0.5f64..0.5) {
            let batch = TimeBatch::filled(24, 3, 10.0);
            let config = DiscountConfig::monthly(r, i).unwrap();
            let identity = DiscountConfig::monthly(0.0, 0.0).unwrap();
            let once = discount(&batch, &config);
            prop_assert_eq!(discount(&once, &identity), once.clone());
            prop_assert_eq!(discount(&discount(&batch, &identity), &config), once);
        }
    }
}
