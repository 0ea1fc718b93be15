//! Configuration errors for the path accumulator.

use std::fmt;

use corrsim_core::types::SimulationError;

use super::config::{MAX_PATHS, MAX_STEPS};

/// Accumulation configuration error.
///
/// Raised by [`AccumulationConfigBuilder::build`](super::AccumulationConfigBuilder::build)
/// when parameters are missing or out of range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Path count outside `[1, MAX_PATHS]`.
    InvalidPathCount(usize),
    /// Step count outside `[1, MAX_STEPS]`.
    InvalidStepCount(usize),
    /// Invalid parameter value with name and description.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPathCount(count) => {
                write!(
                    f,
                    "Invalid path count {}: must be in range [1, {}]",
                    count, MAX_PATHS
                )
            }
            Self::InvalidStepCount(count) => {
                write!(
                    f,
                    "Invalid step count {}: must be in range [1, {}]",
                    count, MAX_STEPS
                )
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "Invalid parameter '{}': {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::InvalidConfig(err.to_string())
    }
}
