//! Growth and contribution modes for the path accumulator.

use corrsim_core::math::periodic_growth_factor;
use corrsim_core::types::DistributionError;
use corrsim_models::marginals::{DriftScaling, MarginalSpec};

use crate::batch::TimeBatch;

/// Source of the per-step growth factor `g_t`.
///
/// # Examples
///
/// ```
/// use corrsim_engine::accumulate::GrowthSpec;
///
/// let growth = GrowthSpec::Deterministic { annual_rate: 0.08, periods_per_year: 12 };
/// assert_eq!(growth.mode_name(), "deterministic");
/// assert!((growth.constant_factor().unwrap().unwrap() - 1.006434).abs() < 1e-6);
/// ```
#[derive(Clone, Debug)]
pub enum GrowthSpec {
    /// Constant factor `(1 + annual_rate)^(1 / periods_per_year)`.
    Deterministic {
        /// Annual compound rate, `> -1`.
        annual_rate: f64,
        /// Compounding periods per year.
        periods_per_year: u32,
    },
    /// Independent factor `exp(r)` per step and path.
    ///
    /// `r` is drawn from `log_returns`, a daily log-return marginal, rescaled
    /// to `days_per_period` days.
    Stochastic {
        /// Daily log-return marginal.
        log_returns: MarginalSpec,
        /// Trading days per step.
        days_per_period: f64,
        /// How the location parameter scales with the horizon.
        drift_scaling: DriftScaling,
    },
    /// Caller-supplied `[steps][paths]` factors.
    Precomputed {
        /// Growth factors per step and path.
        factors: TimeBatch,
    },
}

impl GrowthSpec {
    /// Short label used in logs.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Deterministic { .. } => "deterministic",
            Self::Stochastic { .. } => "stochastic",
            Self::Precomputed { .. } => "precomputed",
        }
    }

    /// The constant periodic factor for deterministic growth, `None` otherwise.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for `annual_rate <= -1` or zero periods.
    pub fn constant_factor(&self) -> Option<Result<f64, DistributionError>> {
        match self {
            Self::Deterministic {
                annual_rate,
                periods_per_year,
            } => Some(periodic_growth_factor(*annual_rate, *periods_per_year)),
            _ => None,
        }
    }

    /// The per-step log-return marginal for stochastic growth.
    ///
    /// A one-day horizon uses `log_returns` unchanged, so any family works
    /// there; longer horizons require a location-scale family.
    pub fn step_log_returns(&self) -> Option<Result<MarginalSpec, DistributionError>> {
        match self {
            Self::Stochastic {
                log_returns,
                days_per_period,
                drift_scaling,
            } => Some(if *days_per_period == 1.0 {
                Ok(log_returns.clone())
            } else {
                log_returns.rescale_horizon(*days_per_period, *drift_scaling)
            }),
            _ => None,
        }
    }
}

/// Source of the per-step contribution `c_t`.
#[derive(Clone, Debug)]
pub enum ContributionSpec {
    /// No contribution at any step.
    None,
    /// `amount` invested once at `t = 0`, then only grown.
    LumpSum {
        /// Initial investment.
        amount: f64,
    },
    /// `amount` added at the start of every step.
    Recurring {
        /// Per-step contribution.
        amount: f64,
    },
    /// Independent draw per step and path.
    Sampled {
        /// Contribution marginal.
        marginal: MarginalSpec,
    },
    /// Caller-supplied `[steps][paths]` amounts, e.g. monthly totals of
    /// gated daily draws.
    Precomputed {
        /// Contributions per step and path.
        amounts: TimeBatch,
    },
}

impl ContributionSpec {
    /// Short label used in logs.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LumpSum { .. } => "lump_sum",
            Self::Recurring { .. } => "recurring",
            Self::Sampled { .. } => "sampled",
            Self::Precomputed { .. } => "precomputed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use corrsim_models::marginals::{Parametric, Pert};

    #[test]
    fn test_constant_factor() {
        let growth = GrowthSpec::Deterministic {
            annual_rate: 0.0,
            periods_per_year: 12,
        };
        assert_relative_eq!(growth.constant_factor().unwrap().unwrap(), 1.0);

        let growth = GrowthSpec::Deterministic {
            annual_rate: -1.5,
            periods_per_year: 12,
        };
        assert!(growth.constant_factor().unwrap().is_err());

        let growth = GrowthSpec::Precomputed {
            factors: TimeBatch::filled(1, 1, 1.0),
        };
        assert!(growth.constant_factor().is_none());
    }

    #[test]
    fn test_step_log_returns_rescales_normal() {
        let growth = GrowthSpec::Stochastic {
            log_returns: Parametric::normal(0.001, 0.01).unwrap().into(),
            days_per_period: 4.0,
            drift_scaling: DriftScaling::Linear,
        };
        let step = growth.step_log_returns().unwrap().unwrap();
        let expected: MarginalSpec = Parametric::normal(0.004, 0.02).unwrap().into();
        assert_eq!(step, expected);
    }

    #[test]
    fn test_step_log_returns_single_day_accepts_any_family() {
        let growth = GrowthSpec::Stochastic {
            log_returns: Pert::new(-0.02, 0.0, 0.03).unwrap().into(),
            days_per_period: 1.0,
            drift_scaling: DriftScaling::Linear,
        };
        assert!(growth.step_log_returns().unwrap().is_ok());

        let growth = GrowthSpec::Stochastic {
            log_returns: Pert::new(-0.02, 0.0, 0.03).unwrap().into(),
            days_per_period: 21.0,
            drift_scaling: DriftScaling::Linear,
        };
        assert!(matches!(
            growth.step_log_returns().unwrap(),
            Err(DistributionError::UnsupportedRescale { .. })
        ));
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ContributionSpec::None.mode_name(), "none");
        assert_eq!(
            ContributionSpec::Recurring { amount: 1.0 }.mode_name(),
            "recurring"
        );
    }
}
