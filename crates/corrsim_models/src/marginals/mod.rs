//! Marginal distributions and the capability trait they share.
//!
//! Every marginal maps a uniform `u` in `[0, 1]` to its own domain through a
//! quantile function. Endpoints map to the support boundaries (which may be
//! infinite); anything outside `[0, 1]`, NaN included, is a [`DomainError`].
//!
//! # Variants
//!
//! - [`Parametric`]: normal, log-normal, gamma, beta, Student-t and uniform
//! - [`Pert`]: bounded unimodal distribution from `(minimum, mode, maximum)`
//! - [`ZeroInflated`]: exactly zero with probability `p`, otherwise a magnitude draw

mod inversion;
pub mod parametric;
pub mod pert;
pub mod zero_inflated;

pub use parametric::{Family, Parametric};
pub use pert::Pert;
pub use zero_inflated::ZeroInflated;

use corrsim_core::types::{DistributionError, DomainError};
use std::fmt::Debug;

/// Capability shared by every marginal distribution.
///
/// Implementors are immutable once built and may be shared across threads.
pub trait Marginal: Debug + Send + Sync {
    /// Inverse CDF at `u`.
    ///
    /// # Errors
    ///
    /// `DomainError::ProbabilityOutOfRange` if `u` is NaN or outside `[0, 1]`.
    fn quantile(&self, u: f64) -> Result<f64, DomainError>;

    /// Cumulative distribution function.
    fn cdf(&self, x: f64) -> f64;

    /// Density of the continuous part. Point masses are not included.
    fn pdf(&self, x: f64) -> f64;

    /// Closed support `(lower, upper)`; bounds may be infinite.
    fn support(&self) -> (f64, f64);

    /// Mean, or `None` where it does not exist (Student-t with `dof <= 1`).
    fn mean(&self) -> Option<f64>;
}

/// Rejects probabilities outside `[0, 1]` (NaN included).
///
/// # Examples
/// ```
/// use corrsim_models::marginals::validate_probability;
///
/// assert_eq!(validate_probability(0.25), Ok(0.25));
/// assert!(validate_probability(1.0 + 1e-12).is_err());
/// assert!(validate_probability(f64::NAN).is_err());
/// ```
#[inline]
pub fn validate_probability(u: f64) -> Result<f64, DomainError> {
    if (0.0..=1.0).contains(&u) {
        Ok(u)
    } else {
        Err(DomainError::ProbabilityOutOfRange { value: u })
    }
}

/// How the location of a daily return distribution scales with horizon.
///
/// The scale always grows with `sqrt(days)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DriftScaling {
    /// Location multiplied by `days` (Brownian motion with drift).
    Linear,
    /// Location multiplied by `sqrt(days)`, like the scale.
    #[default]
    SquareRoot,
}

impl DriftScaling {
    /// Multiplier applied to the location for a horizon of `days`.
    #[inline]
    pub fn location_factor(self, days: f64) -> f64 {
        match self {
            DriftScaling::Linear => days,
            DriftScaling::SquareRoot => days.sqrt(),
        }
    }
}

/// Any supported marginal, dispatched statically.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum MarginalSpec {
    /// Standard parametric family.
    Parametric(Parametric),
    /// Bounded unimodal PERT distribution.
    Pert(Pert),
    /// Zero-inflated compound.
    ZeroInflated(ZeroInflated),
}

impl MarginalSpec {
    /// Short name of the variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MarginalSpec::Parametric(p) => p.family().name(),
            MarginalSpec::Pert(_) => "pert",
            MarginalSpec::ZeroInflated(_) => "zero_inflated",
        }
    }

    /// Rescales a daily distribution to a horizon of `days`.
    ///
    /// Only location-scale parametric families support this; see
    /// [`Parametric::rescale_horizon`].
    pub fn rescale_horizon(
        &self,
        days: f64,
        scaling: DriftScaling,
    ) -> Result<MarginalSpec, DistributionError> {
        match self {
            MarginalSpec::Parametric(p) => Ok(MarginalSpec::Parametric(
                p.rescale_horizon(days, scaling)?,
            )),
            other => Err(DistributionError::UnsupportedRescale {
                family: other.kind_name(),
            }),
        }
    }
}

impl Marginal for MarginalSpec {
    #[inline]
    fn quantile(&self, u: f64) -> Result<f64, DomainError> {
        match self {
            MarginalSpec::Parametric(m) => m.quantile(u),
            MarginalSpec::Pert(m) => m.quantile(u),
            MarginalSpec::ZeroInflated(m) => m.quantile(u),
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        match self {
            MarginalSpec::Parametric(m) => m.cdf(x),
            MarginalSpec::Pert(m) => m.cdf(x),
            MarginalSpec::ZeroInflated(m) => m.cdf(x),
        }
    }

    fn pdf(&self, x: f64) -> f64 {
        match self {
            MarginalSpec::Parametric(m) => m.pdf(x),
            MarginalSpec::Pert(m) => m.pdf(x),
            MarginalSpec::ZeroInflated(m) => m.pdf(x),
        }
    }

    fn support(&self) -> (f64, f64) {
        match self {
            MarginalSpec::Parametric(m) => m.support(),
            MarginalSpec::Pert(m) => m.support(),
            MarginalSpec::ZeroInflated(m) => m.support(),
        }
    }

    fn mean(&self) -> Option<f64> {
        match self {
            MarginalSpec::Parametric(m) => m.mean(),
            MarginalSpec::Pert(m) => m.mean(),
            MarginalSpec::ZeroInflated(m) => m.mean(),
        }
    }
}

impl From<Parametric> for MarginalSpec {
    fn from(m: Parametric) -> Self {
        MarginalSpec::Parametric(m)
    }
}

impl From<Pert> for MarginalSpec {
    fn from(m: Pert) -> Self {
        MarginalSpec::Pert(m)
    }
}

impl From<ZeroInflated> for MarginalSpec {
    fn from(m: ZeroInflated) -> Self {
        MarginalSpec::ZeroInflated(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_validate_probability_bounds() {
        assert_eq!(validate_probability(0.0), Ok(0.0));
        assert_eq!(validate_probability(1.0), Ok(1.0));
        assert!(matches!(
            validate_probability(-0.0001),
            Err(DomainError::ProbabilityOutOfRange { .. })
        ));
        assert!(validate_probability(f64::INFINITY).is_err());
    }

    #[test]
    fn test_drift_scaling_factor() {
        assert_eq!(DriftScaling::default(), DriftScaling::SquareRoot);
        assert_relative_eq!(DriftScaling::Linear.location_factor(21.0), 21.0);
        assert_relative_eq!(DriftScaling::SquareRoot.location_factor(16.0), 4.0);
    }

    #[test]
    fn test_spec_dispatch_matches_variant() {
        let pert = Pert::new(0.0, 2.0, 10.0).unwrap();
        let spec = MarginalSpec::from(pert.clone());
        for u in [0.0, 0.1, 0.5, 0.9, 1.0] {
            assert_eq!(spec.quantile(u).unwrap(), pert.quantile(u).unwrap());
        }
        assert_eq!(spec.support(), (0.0, 10.0));
        assert_relative_eq!(spec.mean().unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rescale_unsupported_for_pert() {
        let spec = MarginalSpec::from(Pert::new(0.0, 1.0, 2.0).unwrap());
        assert_eq!(
            spec.rescale_horizon(21.0, DriftScaling::Linear),
            Err(DistributionError::UnsupportedRescale { family: "pert" })
        );
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_marginal_spec_from_toml() {
            let src = r#"
                kind = "zero_inflated"
                no_event_probability = 0.3

                [magnitude]
                kind = "parametric"
                family = "gamma"
                shape = 2.0
                scale = 5.0
            "#;
            let spec: MarginalSpec = toml::from_str(src).unwrap();
            match &spec {
                MarginalSpec::ZeroInflated(z) => {
                    assert_eq!(z.no_event_probability(), 0.3);
                    assert_eq!(z.magnitude().kind_name(), "gamma");
                }
                other => panic!("unexpected variant {other:?}"),
            }
        }

        #[test]
        fn test_marginal_spec_json_roundtrip() {
            let spec = MarginalSpec::from(Pert::new(20.0, 20.0, 1500.0).unwrap());
            let json = serde_json::to_string(&spec).unwrap();
            assert!(json.contains("\"kind\":\"pert\""));
            let parsed: MarginalSpec = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, spec);
        }

        #[test]
        fn test_invalid_parameters_rejected_on_deserialize() {
            let src = r#"{"kind":"pert","minimum":5.0,"mode":5.0,"maximum":5.0}"#;
            let err = serde_json::from_str::<MarginalSpec>(src).unwrap_err();
            assert!(err.to_string().contains("Degenerate range"));
        }
    }
}
