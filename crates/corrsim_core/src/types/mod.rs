//! Error and calendar types shared by every layer.
//!
//! This module provides:
//! - `error`: structured error taxonomy for correlation, domain, distribution and date failures
//! - `time`: calendar windows and period labels for daily/monthly stepping
//!
//! # Re-exports
//!
//! - [`CorrelationError`], [`DomainError`], [`DistributionError`], [`DateError`],
//!   [`SimulationError`] from `error`

pub mod error;
pub mod time;

pub use error::{CorrelationError, DateError, DistributionError, DomainError, SimulationError};
pub use time::{month_windows, parse_date, period_dates};
