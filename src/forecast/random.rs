//! Injectable randomness for jitter and synthetic weather.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform floats in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_float(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_float(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Always yields the same value. Used to pin jitter in tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub f64);

impl RandomSource for FixedSource {
    fn next_float(&mut self) -> f64 {
        self.0
    }
}

/// Fresh generator for one request: seeded when a seed is configured,
/// otherwise drawn from OS entropy.
pub fn request_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
