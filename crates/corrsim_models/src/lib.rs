//! # corrsim_models (L2: Marginal Distributions)
//!
//! Target-domain marginals for the marginal transform stage.
//!
//! This crate provides:
//! - The [`Marginal`](marginals::Marginal) capability trait: quantile, CDF, density, support, mean
//! - Standard parametric families backed by `statrs` ([`Parametric`](marginals::Parametric))
//! - The bounded unimodal PERT distribution ([`Pert`](marginals::Pert))
//! - Zero-inflated (gated) compounds ([`ZeroInflated`](marginals::ZeroInflated))
//! - Horizon rescaling of fitted daily return distributions
//!
//! ## Design Principles
//!
//! - **Enum-based marginals** ([`MarginalSpec`](marginals::MarginalSpec)) for static dispatch
//! - **Validated at construction**: invalid parameters never reach the sampling loop
//! - **No clamping**: quantile inputs outside `[0, 1]` are errors
//!
//! ## Usage Examples
//!
//! ```rust
//! use corrsim_models::marginals::{Marginal, MarginalSpec, Parametric, Pert, ZeroInflated};
//!
//! let pert = Pert::new(20.0, 20.0, 1500.0).unwrap();
//! let x = pert.quantile(0.5).unwrap();
//! assert!(x > 20.0 && x < 1500.0);
//!
//! let spend = ZeroInflated::new(0.3, Parametric::gamma(2.0, 10.0).unwrap().into()).unwrap();
//! assert_eq!(spend.gated(0.1, 0.9).unwrap(), 0.0);
//!
//! let spec: MarginalSpec = pert.into();
//! assert_eq!(spec.kind_name(), "pert");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod marginals;
