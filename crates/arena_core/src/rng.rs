//! # Session RNG
//!
//! Seeded ChaCha stream for spawn placement and any other randomness the
//! core itself consumes. Same seed, same stream, on every platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic random source owned by one session.
#[derive(Clone, Debug)]
pub struct SessionRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl SessionRng {
    /// Creates a stream from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed the stream was created from.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform value in `[lo, hi)`; `lo` when the range is empty.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.inner.gen_range(lo..hi)
        } else {
            lo
        }
    }

    /// Uniform point inside a disc of `radius` centered on the origin.
    pub fn point_in_disc(&mut self, radius: f32) -> (f32, f32) {
        let r = radius.max(0.0) * self.unit().sqrt();
        let theta = self.unit() * std::f32::consts::TAU;
        (r * theta.cos(), r * theta.sin())
    }
}

impl Default for SessionRng {
    fn default() -> Self {
        Self::new(0)
    }
}
