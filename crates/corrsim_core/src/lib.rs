//! # corrsim_core: Foundation for Correlated Monte Carlo Simulation
//!
//! ## Layer 1 (Foundation) Role
//!
//! corrsim_core is the bottom layer of the workspace, providing:
//! - Structured error types (`types::error`)
//! - Calendar helpers for daily/monthly stepping (`types::time`)
//! - Standard normal CDF/PDF and rate conversions (`math`)
//! - The validated correlation structure and its Cholesky factor (`correlation`)
//!
//! Layer 1 has no dependencies on other corrsim_* crates.
//!
//! ## Usage Examples
//!
//! ```rust
//! use corrsim_core::correlation::CorrelationStructure;
//! use corrsim_core::math::special::norm_cdf;
//!
//! let structure = CorrelationStructure::build(2, &[
//!     1.0, 0.6,
//!     0.6, 1.0,
//! ]).unwrap();
//! assert_eq!(structure.dim(), 2);
//!
//! let mut correlated = [0.0; 2];
//! structure.cholesky().transform_into(&[1.0, 0.0], &mut correlated);
//! assert!((correlated[1] - 0.6).abs() < 1e-12);
//!
//! assert!((norm_cdf(0.0) - 0.5).abs() < 1e-10);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod correlation;
pub mod math;
pub mod types;
