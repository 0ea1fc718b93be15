//! Standard parametric marginals backed by `statrs`.
//!
//! A [`Family`] is the plain parameter record (what a scenario file holds);
//! a [`Parametric`] is the validated distribution built from it.
//!
//! # Examples
//!
//! ```
//! use corrsim_models::marginals::{DriftScaling, Family, Marginal, Parametric};
//!
//! let daily = Parametric::new(Family::StudentT { location: 0.0004, scale: 0.007, dof: 3.0 }).unwrap();
//! let monthly = daily.rescale_horizon(21.0, DriftScaling::Linear).unwrap();
//! assert_eq!(
//!     monthly.family(),
//!     Family::StudentT { location: 0.0004 * 21.0, scale: 0.007 * 21.0_f64.sqrt(), dof: 3.0 }
//! );
//! assert!(monthly.quantile(0.5).unwrap() > 0.0);
//! ```

use statrs::distribution::{Beta, Continuous, ContinuousCDF, Gamma, LogNormal, Normal, StudentsT};

use super::inversion::invert_cdf;
use super::{validate_probability, DriftScaling, Marginal};
use corrsim_core::types::{DistributionError, DomainError};

/// Parameters of a standard parametric family.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "family", rename_all = "snake_case")
)]
pub enum Family {
    /// Normal distribution N(mean, std_dev²).
    Normal {
        /// Mean
        mean: f64,
        /// Standard deviation (> 0)
        std_dev: f64,
    },
    /// Log-normal: `exp(N(mu, sigma²))`.
    LogNormal {
        /// Mean of the underlying normal
        mu: f64,
        /// Standard deviation of the underlying normal (> 0)
        sigma: f64,
    },
    /// Gamma with shape/scale parameterisation (mean = shape × scale).
    Gamma {
        /// Shape k (> 0)
        shape: f64,
        /// Scale θ (> 0)
        scale: f64,
    },
    /// Beta on `[0, 1]`.
    Beta {
        /// First shape parameter (> 0)
        alpha: f64,
        /// Second shape parameter (> 0)
        beta: f64,
    },
    /// Location-scale Student-t.
    StudentT {
        /// Location
        location: f64,
        /// Scale (> 0)
        scale: f64,
        /// Degrees of freedom (> 0)
        dof: f64,
    },
    /// Continuous uniform on `[low, high]`.
    Uniform {
        /// Lower bound
        low: f64,
        /// Upper bound (> low)
        high: f64,
    },
}

impl Family {
    /// Short family name.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Normal { .. } => "normal",
            Family::LogNormal { .. } => "log_normal",
            Family::Gamma { .. } => "gamma",
            Family::Beta { .. } => "beta",
            Family::StudentT { .. } => "student_t",
            Family::Uniform { .. } => "uniform",
        }
    }
}

#[derive(Debug, Clone)]
enum Kernel {
    Normal(Normal),
    LogNormal(Normal),
    Gamma(Gamma),
    Beta(Beta),
    StudentT(StudentsT),
    Uniform { low: f64, high: f64 },
}

/// Validated parametric marginal.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Family", into = "Family")
)]
pub struct Parametric {
    family: Family,
    kernel: Kernel,
}

fn finite(name: &'static str, value: f64) -> Result<f64, DistributionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DistributionError::InvalidParameter {
            name,
            value,
            reason: "must be finite".to_string(),
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, DistributionError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DistributionError::InvalidParameter {
            name,
            value,
            reason: "must be positive and finite".to_string(),
        })
    }
}

fn kernel_error(family: &Family, err: impl std::fmt::Display) -> DistributionError {
    DistributionError::InvalidParameter {
        name: family.name(),
        value: f64::NAN,
        reason: err.to_string(),
    }
}

impl Parametric {
    /// Validates `family` and builds the distribution.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for non-finite or non-positive parameters
    /// - `DegenerateRange` / `InvalidRange` for a uniform with `low >= high`
    pub fn new(family: Family) -> Result<Self, DistributionError> {
        let kernel = match family {
            Family::Normal { mean, std_dev } => {
                finite("mean", mean)?;
                positive("std_dev", std_dev)?;
                Kernel::Normal(Normal::new(mean, std_dev).map_err(|e| kernel_error(&family, e))?)
            }
            Family::LogNormal { mu, sigma } => {
                finite("mu", mu)?;
                positive("sigma", sigma)?;
                Kernel::LogNormal(Normal::new(mu, sigma).map_err(|e| kernel_error(&family, e))?)
            }
            Family::Gamma { shape, scale } => {
                positive("shape", shape)?;
                positive("scale", scale)?;
                // statrs uses the rate parameterisation.
                Kernel::Gamma(Gamma::new(shape, 1.0 / scale).map_err(|e| kernel_error(&family, e))?)
            }
            Family::Beta { alpha, beta } => {
                positive("alpha", alpha)?;
                positive("beta", beta)?;
                Kernel::Beta(Beta::new(alpha, beta).map_err(|e| kernel_error(&family, e))?)
            }
            Family::StudentT {
                location,
                scale,
                dof,
            } => {
                finite("location", location)?;
                positive("scale", scale)?;
                positive("dof", dof)?;
                Kernel::StudentT(
                    StudentsT::new(location, scale, dof).map_err(|e| kernel_error(&family, e))?,
                )
            }
            Family::Uniform { low, high } => {
                finite("low", low)?;
                finite("high", high)?;
                if low == high {
                    return Err(DistributionError::DegenerateRange {
                        minimum: low,
                        maximum: high,
                    });
                }
                if low > high {
                    return Err(DistributionError::InvalidRange {
                        minimum: low,
                        maximum: high,
                    });
                }
                Kernel::Uniform { low, high }
            }
        };

        Ok(Self { family, kernel })
    }

    /// Normal distribution.
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self, DistributionError> {
        Self::new(Family::Normal { mean, std_dev })
    }

    /// Log-normal distribution.
    pub fn log_normal(mu: f64, sigma: f64) -> Result<Self, DistributionError> {
        Self::new(Family::LogNormal { mu, sigma })
    }

    /// Gamma distribution (shape/scale).
    pub fn gamma(shape: f64, scale: f64) -> Result<Self, DistributionError> {
        Self::new(Family::Gamma { shape, scale })
    }

    /// Beta distribution.
    pub fn beta(alpha: f64, beta: f64) -> Result<Self, DistributionError> {
        Self::new(Family::Beta { alpha, beta })
    }

    /// Location-scale Student-t distribution.
    pub fn student_t(location: f64, scale: f64, dof: f64) -> Result<Self, DistributionError> {
        Self::new(Family::StudentT {
            location,
            scale,
            dof,
        })
    }

    /// Uniform distribution.
    pub fn uniform(low: f64, high: f64) -> Result<Self, DistributionError> {
        Self::new(Family::Uniform { low, high })
    }

    /// Parameters this distribution was built from.
    #[inline]
    pub fn family(&self) -> Family {
        self.family
    }

    /// Rescales a per-day distribution to a horizon of `days`.
    ///
    /// For an additive-in-log random walk the scale grows with `sqrt(days)`;
    /// the location grows according to `scaling`. Only the location-scale
    /// families (normal, Student-t) can be rescaled; the Student-t keeps its
    /// degrees of freedom.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `days` is not positive and finite
    /// - `UnsupportedRescale` for any other family
    pub fn rescale_horizon(&self, days: f64, scaling: DriftScaling) -> Result<Self, DistributionError> {
        positive("days", days)?;
        let location_factor = scaling.location_factor(days);
        let scale_factor = days.sqrt();

        match self.family {
            Family::Normal { mean, std_dev } => Self::normal(mean * location_factor, std_dev * scale_factor),
            Family::StudentT {
                location,
                scale,
                dof,
            } => Self::student_t(location * location_factor, scale * scale_factor, dof),
            other => Err(DistributionError::UnsupportedRescale {
                family: other.name(),
            }),
        }
    }

    fn interior_quantile(&self, u: f64) -> f64 {
        match &self.kernel {
            Kernel::Normal(d) => d.inverse_cdf(u),
            Kernel::LogNormal(d) => d.inverse_cdf(u).exp(),
            Kernel::Uniform { low, high } => low + u * (high - low),
            Kernel::Gamma(d) => {
                let guess = d.shape() / d.rate();
                let step = d.shape().sqrt() / d.rate();
                invert_cdf(u, self.support(), guess, step, |x| d.cdf(x), |x| d.pdf(x))
            }
            Kernel::Beta(d) => {
                let guess = d.shape_a() / (d.shape_a() + d.shape_b());
                invert_cdf(u, (0.0, 1.0), guess, 1.0, |x| d.cdf(x), |x| d.pdf(x))
            }
            Kernel::StudentT(d) => invert_cdf(
                u,
                self.support(),
                d.location(),
                d.scale(),
                |x| d.cdf(x),
                |x| d.pdf(x),
            ),
        }
    }
}

impl Marginal for Parametric {
    fn quantile(&self, u: f64) -> Result<f64, DomainError> {
        let u = validate_probability(u)?;
        let (lower, upper) = self.support();
        if u == 0.0 {
            return Ok(lower);
        }
        if u == 1.0 {
            return Ok(upper);
        }
        Ok(self.interior_quantile(u))
    }

    fn cdf(&self, x: f64) -> f64 {
        let (lower, upper) = self.support();
        if x <= lower {
            return 0.0;
        }
        if x >= upper {
            return 1.0;
        }
        match &self.kernel {
            Kernel::Normal(d) => d.cdf(x),
            Kernel::LogNormal(d) => d.cdf(x.ln()),
            Kernel::Gamma(d) => d.cdf(x),
            Kernel::Beta(d) => d.cdf(x),
            Kernel::StudentT(d) => d.cdf(x),
            Kernel::Uniform { low, high } => (x - low) / (high - low),
        }
    }

    fn pdf(&self, x: f64) -> f64 {
        let (lower, upper) = self.support();
        if x < lower || x > upper {
            return 0.0;
        }
        match &self.kernel {
            Kernel::Normal(d) => d.pdf(x),
            Kernel::LogNormal(d) => {
                if x <= 0.0 {
                    0.0
                } else {
                    d.pdf(x.ln()) / x
                }
            }
            Kernel::Gamma(d) => d.pdf(x),
            Kernel::Beta(d) => d.pdf(x),
            Kernel::StudentT(d) => d.pdf(x),
            Kernel::Uniform { low, high } => 1.0 / (high - low),
        }
    }

    fn support(&self) -> (f64, f64) {
        match self.family {
            Family::Normal { .. } | Family::StudentT { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            Family::LogNormal { .. } | Family::Gamma { .. } => (0.0, f64::INFINITY),
            Family::Beta { .. } => (0.0, 1.0),
            Family::Uniform { low, high } => (low, high),
        }
    }

    fn mean(&self) -> Option<f64> {
        match self.family {
            Family::Normal { mean, .. } => Some(mean),
            Family::LogNormal { mu, sigma } => Some((mu + 0.5 * sigma * sigma).exp()),
            Family::Gamma { shape, scale } => Some(shape * scale),
            Family::Beta { alpha, beta } => Some(alpha / (alpha + beta)),
            Family::StudentT { location, dof, .. } => (dof > 1.0).then_some(location),
            Family::Uniform { low, high } => Some(0.5 * (low + high)),
        }
    }
}

impl PartialEq for Parametric {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family
    }
}

impl TryFrom<Family> for Parametric {
    type Error = DistributionError;

    fn try_from(family: Family) -> Result<Self, Self::Error> {
        Self::new(family)
    }
}

impl From<Parametric> for Family {
    fn from(p: Parametric) -> Self {
        p.family
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    // ================================================================
    // Construction
    // ================================================================

    #[test]
    fn test_rejects_non_positive_scale() {
        assert!(matches!(
            Parametric::normal(0.0, 0.0),
            Err(DistributionError::InvalidParameter { name: "std_dev", .. })
        ));
        assert!(matches!(
            Parametric::gamma(-1.0, 2.0),
            Err(DistributionError::InvalidParameter { name: "shape", .. })
        ));
        assert!(matches!(
            Parametric::student_t(0.0, 1.0, 0.0),
            Err(DistributionError::InvalidParameter { name: "dof", .. })
        ));
        assert!(Parametric::normal(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_uniform_range_checks() {
        assert_eq!(
            Parametric::uniform(2.0, 2.0).unwrap_err(),
            DistributionError::DegenerateRange {
                minimum: 2.0,
                maximum: 2.0
            }
        );
        assert!(matches!(
            Parametric::uniform(3.0, 2.0),
            Err(DistributionError::InvalidRange { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_family_name_matches_config_tag() {
        let families = [
            Family::Normal { mean: 0.0, std_dev: 1.0 },
            Family::LogNormal { mu: 0.0, sigma: 1.0 },
            Family::Gamma { shape: 2.0, scale: 1.0 },
            Family::Beta { alpha: 2.0, beta: 3.0 },
            Family::StudentT { location: 0.0, scale: 1.0, dof: 4.0 },
            Family::Uniform { low: 0.0, high: 1.0 },
        ];
        for family in families {
            let json = serde_json::to_value(family).unwrap();
            assert_eq!(json["family"], family.name());
        }
        assert_eq!(Family::LogNormal { mu: 0.0, sigma: 1.0 }.name(), "log_normal");
    }

    // ================================================================
    // Quantiles
    // ================================================================

    #[test]
    fn test_normal_quantile_reference_values() {
        let n = Parametric::normal(1.0, 2.0).unwrap();
        assert_relative_eq!(n.quantile(0.5).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.quantile(0.975).unwrap(), 1.0 + 2.0 * 1.959963984540054, epsilon = 1e-9);
    }

    #[test]
    fn test_lognormal_quantile_is_exp_of_normal() {
        let ln = Parametric::log_normal(0.1, 0.4).unwrap();
        let n = Parametric::normal(0.1, 0.4).unwrap();
        for u in [0.05, 0.5, 0.95] {
            assert_relative_eq!(
                ln.quantile(u).unwrap(),
                n.quantile(u).unwrap().exp(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_gamma_exponential_special_case() {
        // Gamma(1, θ) is exponential with mean θ.
        let g = Parametric::gamma(1.0, 3.0).unwrap();
        for u in [0.01_f64, 0.3, 0.5, 0.99] {
            let expected = -3.0 * (-u).ln_1p();
            assert_relative_eq!(g.quantile(u).unwrap(), expected, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_beta_quantile_closed_form() {
        // Beta(2, 1) has CDF x², so quantile sqrt(u).
        let b = Parametric::beta(2.0, 1.0).unwrap();
        for u in [0.04_f64, 0.25, 0.81] {
            assert_relative_eq!(b.quantile(u).unwrap(), u.sqrt(), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_student_t_cauchy_special_case() {
        // One degree of freedom is Cauchy: quantile = loc + scale * tan(pi (u - 1/2)).
        let t = Parametric::student_t(0.5, 2.0, 1.0).unwrap();
        for u in [0.1_f64, 0.5, 0.75, 0.99] {
            let expected = 0.5 + 2.0 * (std::f64::consts::PI * (u - 0.5)).tan();
            assert_relative_eq!(t.quantile(u).unwrap(), expected, max_relative = 1e-8, epsilon = 1e-10);
        }
        assert_eq!(t.mean(), None);
    }

    #[test]
    fn test_uniform_quantile() {
        let u = Parametric::uniform(-1.0, 3.0).unwrap();
        assert_relative_eq!(u.quantile(0.25).unwrap(), 0.0);
        assert_relative_eq!(u.mean().unwrap(), 1.0);
    }

    #[test]
    fn test_quantile_endpoints_map_to_support() {
        let n = Parametric::normal(0.0, 1.0).unwrap();
        assert_eq!(n.quantile(0.0).unwrap(), f64::NEG_INFINITY);
        assert_eq!(n.quantile(1.0).unwrap(), f64::INFINITY);

        let g = Parametric::gamma(2.0, 1.0).unwrap();
        assert_eq!(g.quantile(0.0).unwrap(), 0.0);

        let b = Parametric::beta(2.0, 3.0).unwrap();
        assert_eq!(b.quantile(1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_quantile_rejects_out_of_range() {
        let n = Parametric::normal(0.0, 1.0).unwrap();
        assert_eq!(
            n.quantile(1.5),
            Err(DomainError::ProbabilityOutOfRange { value: 1.5 })
        );
        assert!(n.quantile(-1e-300).is_err());
        assert!(n.quantile(f64::NAN).is_err());
    }

    // ================================================================
    // Density, CDF, moments
    // ================================================================

    #[test]
    fn test_lognormal_pdf_integrates_against_cdf() {
        let ln = Parametric::log_normal(0.0, 0.5).unwrap();
        let h = 1e-5;
        for x in [0.5, 1.0, 2.0] {
            let numerical = (ln.cdf(x + h) - ln.cdf(x - h)) / (2.0 * h);
            assert_relative_eq!(numerical, ln.pdf(x), max_relative = 1e-6);
        }
        assert_eq!(ln.pdf(-1.0), 0.0);
        assert_eq!(ln.cdf(-1.0), 0.0);
    }

    #[test]
    fn test_means() {
        assert_relative_eq!(Parametric::gamma(2.0, 5.0).unwrap().mean().unwrap(), 10.0);
        assert_relative_eq!(Parametric::beta(2.0, 6.0).unwrap().mean().unwrap(), 0.25);
        assert_relative_eq!(
            Parametric::log_normal(0.0, 1.0).unwrap().mean().unwrap(),
            0.5_f64.exp()
        );
    }

    // ================================================================
    // Horizon rescaling
    // ================================================================

    #[test]
    fn test_rescale_normal_linear_and_square_root() {
        let daily = Parametric::normal(0.001, 0.01).unwrap();

        let linear = daily.rescale_horizon(16.0, DriftScaling::Linear).unwrap();
        assert_eq!(
            linear.family(),
            Family::Normal {
                mean: 0.016,
                std_dev: 0.04
            }
        );

        let sqrt = daily.rescale_horizon(16.0, DriftScaling::SquareRoot).unwrap();
        assert_eq!(
            sqrt.family(),
            Family::Normal {
                mean: 0.004,
                std_dev: 0.04
            }
        );
    }

    #[test]
    fn test_rescale_rejects_other_families() {
        let g = Parametric::gamma(2.0, 1.0).unwrap();
        assert_eq!(
            g.rescale_horizon(21.0, DriftScaling::Linear),
            Err(DistributionError::UnsupportedRescale { family: "gamma" })
        );
        let n = Parametric::normal(0.0, 1.0).unwrap();
        assert!(n.rescale_horizon(0.0, DriftScaling::Linear).is_err());
    }

    proptest! {
        #[test]
        fn prop_quantile_inverts_cdf(
            shape in 0.5f64..10.0,
            scale in 0.1f64..5.0,
            u in 0.001f64..0.999,
        ) {
            let g = Parametric::gamma(shape, scale).unwrap();
            let x = g.quantile(u).unwrap();
            prop_assert!((g.cdf(x) - u).abs() < 1e-9);
        }

        #[test]
        fn prop_student_t_quantile_monotone(dof in 1.0f64..30.0, a in 0.01f64..0.99, b in 0.01f64..0.99) {
            let t = Parametric::student_t(0.0, 1.0, dof).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(t.quantile(lo).unwrap() <= t.quantile(hi).unwrap());
        }
    }
}
