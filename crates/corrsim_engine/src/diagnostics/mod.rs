//! Statistical diagnostics for sampled batches.
//!
//! The numeric content behind pair plots, uniformity checks and fit-quality
//! overlays: correlation matrices, Kolmogorov–Smirnov statistics, integer
//! histograms and density grids. Rendering is left to callers.

mod correlation;
mod distribution;

pub use correlation::{average_ranks, pearson_matrix, spearman_matrix};
pub use distribution::{
    density_grid, ks_critical_value, ks_statistic_uniform, unit_histogram, zero_fraction,
};
