//! # corrsim_engine (L3: Simulation Engine)
//!
//! Correlated Monte Carlo pipeline:
//!
//! ```text
//! CorrelationStructure → CopulaSampler → transform → Accumulator → summarize
//!   (corrsim_core)        uniforms        marginals    paths        percentiles
//! ```
//!
//! This crate provides:
//! - [`rng::SimRng`]: owned, seeded random source threaded through every sampling call
//! - [`batch`]: row-major sample batches and `[steps][paths]` time batches
//! - [`copula`]: Gaussian copula sampling of correlated uniforms
//! - [`transform`]: per-column inverse-CDF transforms, including gated columns
//! - [`accumulate`]: path accumulator with deterministic, stochastic and precomputed growth
//! - [`aggregate`]: reduction of a time batch over fixed or calendar windows
//! - [`summary`]: percentiles and discounting of a path ensemble
//! - [`diagnostics`]: rank/linear correlation, KS uniformity, histograms, density grids
//!
//! ## Reproducibility
//!
//! Batches are generated in fixed chunks of paths, each with its own
//! generator seeded from the caller's [`rng::SimRng`]. Results depend only on
//! the seed, never on the number of worker threads.
//!
//! ## Usage Example
//!
//! ```rust
//! use corrsim_core::correlation::CorrelationStructure;
//! use corrsim_engine::copula::sample_uniform;
//! use corrsim_engine::rng::SimRng;
//! use corrsim_engine::transform::{transform, ColumnSpec};
//! use corrsim_models::marginals::{Parametric, Pert};
//!
//! let structure = CorrelationStructure::build(2, &[1.0, 0.7, 0.7, 1.0]).unwrap();
//! let mut rng = SimRng::from_seed(7);
//! let uniforms = sample_uniform(&structure, 1_000, &mut rng);
//!
//! let specs = vec![
//!     ColumnSpec::continuous(0, Parametric::normal(0.0, 1.0).unwrap().into()),
//!     ColumnSpec::continuous(1, Pert::new(20.0, 50.0, 200.0).unwrap().into()),
//! ];
//! let samples = transform(&uniforms, &specs).unwrap();
//! assert_eq!(samples.paths(), 1_000);
//! assert!(samples.column(1).unwrap().iter().all(|&x| (20.0..=200.0).contains(&x)));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod accumulate;
pub mod aggregate;
pub mod batch;
pub mod copula;
pub mod diagnostics;
pub mod parallel;
pub mod rng;
pub mod summary;
pub mod transform;
