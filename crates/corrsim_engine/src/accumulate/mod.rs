//! Path accumulation through discrete time steps.
//!
//! Every path evolves by the same recurrence
//!
//! ```text
//! balance_t = (balance_{t-1} + c_t) × g_t,    balance_{-1} = 0
//! ```
//!
//! where the growth factor `g_t` and contribution `c_t` come from a
//! [`GrowthSpec`] and a [`ContributionSpec`]. A lump sum of `L` with constant
//! growth `g` ends at `L·g^T`; a recurring contribution `c` ends at
//! `c·(g^(T+1) − g)/(g − 1)`.
//!
//! Steps run strictly in order; within a step all paths are independent and
//! processed in parallel.

mod accumulator;
mod config;
mod ensemble;
mod error;
mod modes;
mod stepper;
mod workspace;

pub use accumulator::{run_accumulation, Accumulator};
pub use config::{AccumulationConfig, AccumulationConfigBuilder, MAX_PATHS, MAX_STEPS};
pub use ensemble::PathEnsemble;
pub use error::ConfigError;
pub use modes::{ContributionSpec, GrowthSpec};
pub use stepper::advance_step;
pub use workspace::{AccumulationWorkspace, StepBuffers};
