//! Path accumulation configuration.
//!
//! [`AccumulationConfig`] is immutable and validated once, at build time, so
//! a running accumulator never has to re-check shapes or rates.

use super::error::ConfigError;
use super::modes::{ContributionSpec, GrowthSpec};
use crate::batch::TimeBatch;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: usize = 100_000;

/// Path accumulation configuration.
///
/// Use [`AccumulationConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use corrsim_engine::accumulate::{AccumulationConfig, ContributionSpec, GrowthSpec};
///
/// let config = AccumulationConfig::builder()
///     .time_steps(240)
///     .path_count(1_000)
///     .seed(42)
///     .growth(GrowthSpec::Deterministic { annual_rate: 0.08, periods_per_year: 12 })
///     .contribution(ContributionSpec::Recurring { amount: 182.6 })
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.time_steps(), 240);
/// assert_eq!(config.path_count(), 1_000);
/// ```
#[derive(Clone, Debug)]
pub struct AccumulationConfig {
    /// Number of time steps per path.
    time_steps: usize,
    /// Number of simulation paths.
    path_count: usize,
    /// Optional seed for reproducibility.
    seed: Option<u64>,
    /// Growth factor source.
    growth: GrowthSpec,
    /// Contribution source.
    contribution: ContributionSpec,
}

impl AccumulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> AccumulationConfigBuilder {
        AccumulationConfigBuilder::default()
    }

    /// Returns the number of time steps per path.
    #[inline]
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Returns the number of simulation paths.
    #[inline]
    pub fn path_count(&self) -> usize {
        self.path_count
    }

    /// Returns the optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the growth factor source.
    #[inline]
    pub fn growth(&self) -> &GrowthSpec {
        &self.growth
    }

    /// Returns the contribution source.
    #[inline]
    pub fn contribution(&self) -> &ContributionSpec {
        &self.contribution
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `path_count` is 0 or greater than 10,000,000
    /// - `time_steps` is 0 or greater than 100,000
    /// - a growth or contribution parameter is invalid, or a precomputed
    ///   batch does not have shape `[time_steps][path_count]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path_count == 0 || self.path_count > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.path_count));
        }
        if self.time_steps == 0 || self.time_steps > MAX_STEPS {
            return Err(ConfigError::InvalidStepCount(self.time_steps));
        }
        self.validate_growth()?;
        self.validate_contribution()
    }

    fn validate_growth(&self) -> Result<(), ConfigError> {
        let invalid = |value: String| ConfigError::InvalidParameter {
            name: "growth",
            value,
        };

        match &self.growth {
            GrowthSpec::Deterministic { .. } => {
                if let Some(Err(e)) = self.growth.constant_factor() {
                    return Err(invalid(e.to_string()));
                }
            }
            GrowthSpec::Stochastic {
                days_per_period, ..
            } => {
                if !(days_per_period.is_finite() && *days_per_period > 0.0) {
                    return Err(invalid(format!(
                        "days_per_period must be positive, got {}",
                        days_per_period
                    )));
                }
                if let Some(Err(e)) = self.growth.step_log_returns() {
                    return Err(invalid(e.to_string()));
                }
            }
            GrowthSpec::Precomputed { factors } => {
                self.check_shape("growth", factors)?;
                if factors.as_slice().iter().any(|g| !g.is_finite()) {
                    return Err(invalid("precomputed factors must be finite".to_string()));
                }
            }
        }
        Ok(())
    }

    fn validate_contribution(&self) -> Result<(), ConfigError> {
        let invalid = |value: String| ConfigError::InvalidParameter {
            name: "contribution",
            value,
        };

        match &self.contribution {
            ContributionSpec::None | ContributionSpec::Sampled { .. } => {}
            ContributionSpec::LumpSum { amount } | ContributionSpec::Recurring { amount } => {
                if !amount.is_finite() {
                    return Err(invalid(format!("amount must be finite, got {}", amount)));
                }
            }
            ContributionSpec::Precomputed { amounts } => {
                self.check_shape("contribution", amounts)?;
                if amounts.as_slice().iter().any(|c| !c.is_finite()) {
                    return Err(invalid("precomputed amounts must be finite".to_string()));
                }
            }
        }
        Ok(())
    }

    fn check_shape(&self, name: &'static str, batch: &TimeBatch) -> Result<(), ConfigError> {
        if batch.steps() != self.time_steps || batch.paths() != self.path_count {
            return Err(ConfigError::InvalidParameter {
                name,
                value: format!(
                    "precomputed batch has shape [{}][{}], expected [{}][{}]",
                    batch.steps(),
                    batch.paths(),
                    self.time_steps,
                    self.path_count
                ),
            });
        }
        Ok(())
    }
}

/// Builder for [`AccumulationConfig`].
///
/// # Examples
///
/// ```rust
/// use corrsim_engine::accumulate::{AccumulationConfig, ContributionSpec, GrowthSpec};
///
/// let err = AccumulationConfig::builder()
///     .time_steps(12)
///     .path_count(100)
///     .contribution(ContributionSpec::LumpSum { amount: 6.0 })
///     .build()
///     .unwrap_err();
/// assert!(err.to_string().contains("growth"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AccumulationConfigBuilder {
    time_steps: Option<usize>,
    path_count: Option<usize>,
    seed: Option<u64>,
    growth: Option<GrowthSpec>,
    contribution: Option<ContributionSpec>,
}

impl AccumulationConfigBuilder {
    /// Sets the number of time steps, in `[1, 100_000]`.
    #[inline]
    pub fn time_steps(mut self, time_steps: usize) -> Self {
        self.time_steps = Some(time_steps);
        self
    }

    /// Sets the number of paths, in `[1, 10_000_000]`.
    #[inline]
    pub fn path_count(mut self, path_count: usize) -> Self {
        self.path_count = Some(path_count);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the growth factor source.
    #[inline]
    pub fn growth(mut self, growth: GrowthSpec) -> Self {
        self.growth = Some(growth);
        self
    }

    /// Sets the contribution source.
    #[inline]
    pub fn contribution(mut self, contribution: ContributionSpec) -> Self {
        self.contribution = Some(contribution);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if a required field is missing, otherwise any
    /// error from [`AccumulationConfig::validate`].
    pub fn build(self) -> Result<AccumulationConfig, ConfigError> {
        let missing = |name: &'static str| ConfigError::InvalidParameter {
            name,
            value: "must be specified".to_string(),
        };

        let config = AccumulationConfig {
            time_steps: self.time_steps.ok_or_else(|| missing("time_steps"))?,
            path_count: self.path_count.ok_or_else(|| missing("path_count"))?,
            seed: self.seed,
            growth: self.growth.ok_or_else(|| missing("growth"))?,
            contribution: self.contribution.unwrap_or(ContributionSpec::None),
        };

        config.validate()?;
        Ok(config)
    }
}
