//! CLI error types.

use thiserror::Error;

use corrsim_core::types::{
    CorrelationError, DateError, DistributionError, DomainError, SimulationError,
};
use corrsim_engine::accumulate::ConfigError as AccumulationConfigError;

use crate::config::ConfigError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

macro_rules! via_simulation_error {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for CliError {
                fn from(err: $err) -> Self {
                    CliError::Simulation(err.into())
                }
            }
        )*
    };
}

via_simulation_error!(
    AccumulationConfigError,
    CorrelationError,
    DateError,
    DistributionError,
    DomainError,
);

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
