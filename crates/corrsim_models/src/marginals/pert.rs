//! Bounded unimodal (PERT) distribution.
//!
//! A Beta distribution on `[minimum, maximum]` whose shape parameters are
//! derived from the most likely value:
//!
//! ```text
//! α = 1 + 4 (mode − minimum) / (maximum − minimum)
//! β = 1 + 4 (maximum − mode) / (maximum − minimum)
//! ```
//!
//! so `α + β = 6` and the mean is `(minimum + 4·mode + maximum) / 6`.

use statrs::distribution::{Beta, Continuous, ContinuousCDF};

use super::inversion::invert_cdf;
use super::{validate_probability, Marginal};
use corrsim_core::types::{DistributionError, DomainError};

/// PERT distribution parameterised by `(minimum, mode, maximum)`.
///
/// # Examples
///
/// ```
/// use corrsim_models::marginals::{Marginal, Pert};
///
/// let pert = Pert::new(20.0, 20.0, 1500.0).unwrap();
/// assert_eq!(pert.alpha(), 1.0);
/// assert_eq!(pert.beta(), 5.0);
/// assert_eq!(pert.quantile(0.0).unwrap(), 20.0);
/// assert_eq!(pert.quantile(1.0).unwrap(), 1500.0);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "PertParams", into = "PertParams")
)]
pub struct Pert {
    minimum: f64,
    mode: f64,
    maximum: f64,
    alpha: f64,
    beta: f64,
    kernel: Beta,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct PertParams {
    minimum: f64,
    mode: f64,
    maximum: f64,
}

impl Pert {
    /// Builds a PERT distribution.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if any bound is not finite
    /// - `InvalidRange` if `minimum > maximum`
    /// - `DegenerateRange` if `minimum == maximum`
    /// - `ModeOutOfRange` if `mode` lies outside `[minimum, maximum]`
    pub fn new(minimum: f64, mode: f64, maximum: f64) -> Result<Self, DistributionError> {
        for (name, value) in [("minimum", minimum), ("mode", mode), ("maximum", maximum)] {
            if !value.is_finite() {
                return Err(DistributionError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite".to_string(),
                });
            }
        }
        if minimum > maximum {
            return Err(DistributionError::InvalidRange { minimum, maximum });
        }
        if minimum == maximum {
            return Err(DistributionError::DegenerateRange { minimum, maximum });
        }
        if mode < minimum || mode > maximum {
            return Err(DistributionError::ModeOutOfRange {
                minimum,
                mode,
                maximum,
            });
        }

        let range = maximum - minimum;
        let alpha = 1.0 + 4.0 * (mode - minimum) / range;
        let beta = 1.0 + 4.0 * (maximum - mode) / range;
        let kernel = Beta::new(alpha, beta).map_err(|e| DistributionError::InvalidParameter {
            name: "mode",
            value: mode,
            reason: e.to_string(),
        })?;

        Ok(Self {
            minimum,
            mode,
            maximum,
            alpha,
            beta,
            kernel,
        })
    }

    /// Lower bound.
    #[inline]
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Most likely value.
    #[inline]
    pub fn mode(&self) -> f64 {
        self.mode
    }

    /// Upper bound.
    #[inline]
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// First Beta shape parameter.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Second Beta shape parameter.
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    #[inline]
    fn range(&self) -> f64 {
        self.maximum - self.minimum
    }
}

impl Marginal for Pert {
    fn quantile(&self, u: f64) -> Result<f64, DomainError> {
        let u = validate_probability(u)?;
        if u == 0.0 {
            return Ok(self.minimum);
        }
        if u == 1.0 {
            return Ok(self.maximum);
        }
        let guess = self.alpha / (self.alpha + self.beta);
        let z = invert_cdf(
            u,
            (0.0, 1.0),
            guess,
            1.0,
            |x| self.kernel.cdf(x),
            |x| self.kernel.pdf(x),
        );
        Ok((self.minimum + self.range() * z).min(self.maximum))
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= self.minimum {
            0.0
        } else if x >= self.maximum {
            1.0
        } else {
            self.kernel.cdf((x - self.minimum) / self.range())
        }
    }

    fn pdf(&self, x: f64) -> f64 {
        if x < self.minimum || x > self.maximum {
            0.0
        } else {
            self.kernel.pdf((x - self.minimum) / self.range()) / self.range()
        }
    }

    fn support(&self) -> (f64, f64) {
        (self.minimum, self.maximum)
    }

    fn mean(&self) -> Option<f64> {
        Some((self.minimum + 4.0 * self.mode + self.maximum) / 6.0)
    }
}

impl PartialEq for Pert {
    fn eq(&self, other: &Self) -> bool {
        self.minimum == other.minimum && self.mode == other.mode && self.maximum == other.maximum
    }
}

#[cfg(feature = "serde")]
impl TryFrom<PertParams> for Pert {
    type Error = DistributionError;

    fn try_from(p: PertParams) -> Result<Self, Self::Error> {
        Self::new(p.minimum, p.mode, p.maximum)
    }
}

#[cfg(feature = "serde")]
impl From<Pert> for PertParams {
    fn from(p: Pert) -> Self {
        PertParams {
            minimum: p.minimum,
            mode: p.mode,
            maximum: p.maximum,
        }
    }
}
