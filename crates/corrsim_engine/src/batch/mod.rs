//! Sample batches.
//!
//! - [`SampleBatch`]: `(paths, dim)` draws, row-major (one row per path)
//! - [`TimeSampleBatch`]: `(time_steps, paths, dim)` draws, one `SampleBatch` layout per step
//! - [`TimeBatch`]: `(time_steps, paths)` scalars, one row per step; the path
//!   ensemble, growth factors and contributions all use this layout
//!
//! A batch does not record which pipeline stage produced it (normal,
//! uniform or target domain); the producing function's name says so.

mod sample;
mod time;

pub use sample::{SampleBatch, TimeSampleBatch};
pub use time::TimeBatch;
