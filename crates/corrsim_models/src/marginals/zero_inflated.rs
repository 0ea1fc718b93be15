//! Zero-inflated (gated) compound distribution.
//!
//! With probability `p` no event happens and the value is exactly zero;
//! otherwise the value is drawn from a continuous magnitude distribution.
//!
//! Two sampling forms are provided:
//! - [`ZeroInflated::gated`] takes separate gate and magnitude uniforms. The
//!   gate alone decides whether the output is zero, so `P(output = 0) = p`
//!   exactly and the gate may be correlated with other factors independently
//!   of the magnitude.
//! - [`Marginal::quantile`] is the mixture quantile on a single uniform:
//!   `u < p` gives zero, otherwise the magnitude quantile of `(u − p)/(1 − p)`.

use super::{validate_probability, Marginal, MarginalSpec};
use corrsim_core::types::{DistributionError, DomainError};

/// Zero with probability `no_event_probability`, else a magnitude draw.
///
/// # Examples
///
/// ```
/// use corrsim_models::marginals::{Marginal, Parametric, ZeroInflated};
///
/// let z = ZeroInflated::new(0.3, Parametric::uniform(10.0, 20.0).unwrap().into()).unwrap();
/// assert_eq!(z.gated(0.29, 0.5).unwrap(), 0.0);
/// assert_eq!(z.gated(0.31, 0.5).unwrap(), 15.0);
/// assert!((z.quantile(0.65).unwrap() - 15.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ZeroInflatedParams", into = "ZeroInflatedParams")
)]
pub struct ZeroInflated {
    no_event_probability: f64,
    magnitude: Box<MarginalSpec>,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ZeroInflatedParams {
    no_event_probability: f64,
    magnitude: MarginalSpec,
}

impl ZeroInflated {
    /// Builds a zero-inflated compound.
    ///
    /// # Errors
    ///
    /// `InvalidProbability` if `no_event_probability` is NaN or outside `[0, 1]`.
    pub fn new(no_event_probability: f64, magnitude: MarginalSpec) -> Result<Self, DistributionError> {
        if !(0.0..=1.0).contains(&no_event_probability) {
            return Err(DistributionError::InvalidProbability {
                p: no_event_probability,
            });
        }
        Ok(Self {
            no_event_probability,
            magnitude: Box::new(magnitude),
        })
    }

    /// Probability of the value being exactly zero.
    #[inline]
    pub fn no_event_probability(&self) -> f64 {
        self.no_event_probability
    }

    /// Distribution of the value when an event happens.
    #[inline]
    pub fn magnitude(&self) -> &MarginalSpec {
        &self.magnitude
    }

    /// Two-coordinate form: gate first, then magnitude.
    ///
    /// Both inputs are validated even when the gate closes.
    #[inline]
    pub fn gated(&self, u_gate: f64, u_magnitude: f64) -> Result<f64, DomainError> {
        let u_gate = validate_probability(u_gate)?;
        let u_magnitude = validate_probability(u_magnitude)?;
        if u_gate < self.no_event_probability || self.no_event_probability >= 1.0 {
            Ok(0.0)
        } else {
            self.magnitude.quantile(u_magnitude)
        }
    }
}

impl Marginal for ZeroInflated {
    fn quantile(&self, u: f64) -> Result<f64, DomainError> {
        let u = validate_probability(u)?;
        let p = self.no_event_probability;
        if u < p || p >= 1.0 {
            return Ok(0.0);
        }
        self.magnitude.quantile((u - p) / (1.0 - p))
    }

    fn cdf(&self, x: f64) -> f64 {
        let p = self.no_event_probability;
        let mass = if x >= 0.0 { p } else { 0.0 };
        mass + (1.0 - p) * self.magnitude.cdf(x)
    }

    fn pdf(&self, x: f64) -> f64 {
        (1.0 - self.no_event_probability) * self.magnitude.pdf(x)
    }

    fn support(&self) -> (f64, f64) {
        let (lower, upper) = self.magnitude.support();
        (lower.min(0.0), upper.max(0.0))
    }

    fn mean(&self) -> Option<f64> {
        self.magnitude
            .mean()
            .map(|m| (1.0 - self.no_event_probability) * m)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<ZeroInflatedParams> for ZeroInflated {
    type Error = DistributionError;

    fn try_from(p: ZeroInflatedParams) -> Result<Self, Self::Error> {
        Self::new(p.no_event_probability, p.magnitude)
    }
}

#[cfg(feature = "serde")]
impl From<ZeroInflated> for ZeroInflatedParams {
    fn from(z: ZeroInflated) -> Self {
        ZeroInflatedParams {
            no_event_probability: z.no_event_probability,
            magnitude: *z.magnitude,
        }
    }
}
