//! Deterministic linear-congruential engine and seed-derivation helpers.
//!
//! The engine never owns its state. Callers keep a [`RandomState`] value and
//! lend it to a [`LinearRandomEngine`] for as long as they need draws, which
//! makes it trivial to persist a run's randomness or hand an independent
//! substream to a nested sampler through [`fork_random_state`].

use std::hash::Hasher;

use rand::{Rng, RngCore};
use siphasher::sip::SipHasher13;

use crate::errors::{ErrorInfo, SketchError};

/// Externally owned state of a [`LinearRandomEngine`].
pub type RandomState = i64;

/// Seed value requesting a state drawn from system entropy.
pub const ENTROPY_SEED: RandomState = -1;

/// Minimal standard LCG (`next = multiplier * state mod modulus`) over a borrowed state.
#[derive(Debug)]
pub struct LinearRandomEngine<'a> {
    state: &'a mut RandomState,
}

impl<'a> LinearRandomEngine<'a> {
    /// Multiplier of the recurrence.
    pub const MULTIPLIER: RandomState = 48271;
    /// Increment of the recurrence (zero: multiplicative generator).
    pub const INCREMENT: RandomState = 0;
    /// Modulus of the recurrence (the Mersenne prime 2^31 - 1).
    pub const MODULUS: RandomState = 2_147_483_647;

    /// Wraps a caller owned state. The state should already be normalized.
    pub fn new(state: &'a mut RandomState) -> Self {
        Self { state }
    }

    /// Smallest value the engine can emit.
    pub const fn min() -> u64 {
        0
    }

    /// Largest value the engine can emit.
    pub const fn max() -> u64 {
        (Self::MODULUS - 1) as u64
    }

    /// Draws a state from system entropy, already reduced modulo [`Self::MODULUS`].
    pub fn device_random_value() -> RandomState {
        (rand::thread_rng().next_u64() % Self::MODULUS as u64) as RandomState
    }

    /// Maps an arbitrary seed into `[1, MODULUS - 1]`.
    ///
    /// [`ENTROPY_SEED`] requests a seed from system entropy, zero maps to one and
    /// any other negative seed is rejected.
    pub fn normalize_state(seed: RandomState) -> Result<RandomState, SketchError> {
        let mut state = if seed == ENTROPY_SEED {
            Self::device_random_value()
        } else {
            seed % Self::MODULUS
        };
        if state == 0 {
            state = 1;
        }
        if state < 0 {
            return Err(SketchError::Rng(
                ErrorInfo::new("negative-seed", "random seed must not be negative")
                    .with_context("seed", seed.to_string())
                    .with_hint("use -1 to request a seed from system entropy"),
            ));
        }
        Ok(state)
    }

    /// Replaces the borrowed state with the normalized form of `seed`.
    pub fn init_state(&mut self, seed: RandomState) -> Result<(), SketchError> {
        *self.state = Self::normalize_state(seed)?;
        Ok(())
    }

    /// Current value of the borrowed state.
    pub fn state(&self) -> RandomState {
        *self.state
    }

    /// Advances the state once and returns the new value.
    pub fn next_state(&mut self) -> u64 {
        *self.state = (Self::INCREMENT + *self.state * Self::MULTIPLIER) % Self::MODULUS;
        *self.state as u64
    }

    /// Advances the parent once and derives a decorrelated seed for a child stream.
    pub fn fork_state(&mut self) -> RandomState {
        (self.next_state() as RandomState * 32767) % 1_999_999_973
    }
}

impl RngCore for LinearRandomEngine<'_> {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        // Each step carries 31 bits; three steps cover the full word.
        let high = self.next_state().saturating_sub(1);
        let mid = self.next_state().saturating_sub(1);
        let low = self.next_state().saturating_sub(1);
        (high << 33) ^ (mid << 2) ^ low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Forks a new random state; the parent state is advanced by exactly one step.
pub fn fork_random_state(state: &mut RandomState) -> RandomState {
    LinearRandomEngine::new(state).fork_state()
}

/// Samples an integer uniformly from `[min, max)`.
pub fn sample_uniform_int(
    min: i64,
    max: i64,
    state: &mut RandomState,
) -> Result<i64, SketchError> {
    if min >= max {
        return Err(SketchError::Rng(
            ErrorInfo::new("empty-range", "uniform integer range is empty")
                .with_context("min", min.to_string())
                .with_context("max", max.to_string()),
        ));
    }
    Ok(LinearRandomEngine::new(state).gen_range(min..max))
}

/// Samples a real number uniformly from `[min, max)`.
pub fn sample_uniform_double(
    min: f64,
    max: f64,
    state: &mut RandomState,
) -> Result<f64, SketchError> {
    if !(min < max) {
        return Err(SketchError::Rng(
            ErrorInfo::new("empty-range", "uniform real range is empty")
                .with_context("min", min.to_string())
                .with_context("max", max.to_string()),
        ));
    }
    Ok(LinearRandomEngine::new(state).gen_range(min..max))
}

/// Derives the deterministic seed for a labelled substream.
///
/// Hashes `(master_seed, substream)` with SipHash-1-3 under fixed zero keys so the
/// mapping is stable across platforms.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
