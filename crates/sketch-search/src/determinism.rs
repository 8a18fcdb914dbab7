use sketch_core::rng::{derive_substream_seed, LinearRandomEngine, RandomState, ENTROPY_SEED};
use sketch_core::SketchError;

use crate::config::SeedPolicy;

/// Derives the normalized root random state of a run from its seed policy.
///
/// Without a label the master seed is normalized directly. A label is folded
/// byte by byte into the master seed so differently labelled runs sharing one
/// master seed draw decorrelated streams.
pub fn run_state(policy: &SeedPolicy) -> Result<RandomState, SketchError> {
    match &policy.label {
        Some(label) if policy.master_seed != ENTROPY_SEED => {
            let base = LinearRandomEngine::normalize_state(policy.master_seed)? as u64;
            let mixed = label
                .bytes()
                .fold(base, |acc, byte| derive_substream_seed(acc, byte as u64));
            let reduced = mixed % LinearRandomEngine::MODULUS as u64;
            LinearRandomEngine::normalize_state(reduced as RandomState)
        }
        _ => LinearRandomEngine::normalize_state(policy.master_seed),
    }
}
