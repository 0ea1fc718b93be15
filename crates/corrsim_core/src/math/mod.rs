//! Numerical building blocks.
//!
//! - [`special`]: standard normal CDF and PDF used by the Gaussian copula
//! - [`rates`]: annual-to-periodic rate conversions shared by compounding and discounting

pub mod rates;
pub mod special;

pub use rates::{periodic_growth_factor, periodic_log_rate};
pub use special::{norm_cdf, norm_pdf};
