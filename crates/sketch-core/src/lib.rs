#![deny(missing_docs)]

//! Core error, randomness and target types shared by the sketch search crates.

pub mod errors;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, SketchError};
pub use rng::{
    derive_substream_seed, fork_random_state, sample_uniform_double, sample_uniform_int,
    LinearRandomEngine, RandomState, ENTROPY_SEED,
};
pub use types::{Arch, Target};
