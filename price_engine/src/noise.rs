//! Gaussian noise used to drive simulated price movement.
//!
//! Draws come from a `UniformSource`, so the ambient thread RNG can be swapped for a
//! seeded generator (reproducible runs) or a fixed replay sequence (tests).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Substituted for a zero first uniform so the logarithm stays finite.
const U1_FLOOR: f64 = 0.001;

/// Provider of uniform variates in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

/// Ambient per-thread RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl UniformSource for ThreadRngSource {
    fn next_uniform(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic generator seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl UniformSource for SeededSource {
    fn next_uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed cycle of values, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    /// An empty sequence yields `0.5` forever.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}

impl<S: UniformSource + ?Sized> UniformSource for Box<S> {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// One draw from N(0, std_dev²) via the Box–Muller transform.
pub fn gaussian_noise<S: UniformSource + ?Sized>(source: &mut S, std_dev: f64) -> f64 {
    let u1 = source.next_uniform();
    let u2 = source.next_uniform();
    let u1 = if u1 == 0.0 { U1_FLOOR } else { u1 };
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * std_dev
}
