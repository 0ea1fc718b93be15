//! # Random Number Generation
//!
//! - [`prng`]: [`SimRng`], the seeded generator wrapper
//! - [`stream`]: derivation of independent per-chunk seeds
//!
//! ## Design
//!
//! - **Reproducibility**: every generator is created from an explicit seed
//! - **No global state**: the generator is an owned value passed to each sampling call
//! - **Thread-count independence**: parallel work is split into fixed chunks,
//!   each seeded with [`chunk_seed`] from one base seed
//!
//! ## Usage Example
//!
//! ```rust
//! use corrsim_engine::rng::SimRng;
//!
//! let mut rng = SimRng::from_seed(12345);
//! let u = rng.gen_uniform();
//! assert!((0.0..1.0).contains(&u));
//!
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//! ```

pub mod prng;
pub mod stream;

pub use prng::SimRng;
pub use stream::{chunk_seed, splitmix64};
