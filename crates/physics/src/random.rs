//! Random number sources for ragdoll noise and retargeting.
//!
//! Everything random in the simulation is drawn through [`RandomSource`] so a
//! run is reproducible from its seed. [`SeededRandom`] is the xorshift32
//! generator the [`Simulation`](crate::Simulation) owns; [`SequenceRandom`]
//! replays a fixed list of values for tests.

use serde::{Deserialize, Serialize};

/// A source of uniform random floats.
pub trait RandomSource {
    /// Returns a random float between 0 (inclusive) and 1 (exclusive).
    fn next_f32(&mut self) -> f32;

    /// Returns a random float in the range [min, max).
    fn next_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns a random float in [-magnitude, magnitude).
    fn next_signed(&mut self, magnitude: f32) -> f32 {
        self.next_range(-magnitude, magnitude)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}

/// Deterministic seeded random number generator using xorshift32 algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// Creates a new RNG with the given seed.
    /// Seed of 0 is treated as 1 to avoid degenerate sequence.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Returns the raw u32 value from the RNG.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns the current internal state.
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SeededRandom {
    fn next_f32(&mut self) -> f32 {
        // 24 bits of mantissa keeps the result strictly below 1.0.
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Replays a fixed sequence of values in [0, 1), cycling when exhausted.
///
/// An empty sequence always yields 0.5, which maps to the midpoint of any
/// requested range (zero for signed draws).
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that always returns the midpoint.
    pub fn centered() -> Self {
        Self::new(Vec::new())
    }
}

impl RandomSource for SequenceRandom {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value.clamp(0.0, 0.999_999)
    }
}
