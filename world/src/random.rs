//! Default seeded random source.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use road_defence_core::RandomSource;

/// ChaCha-backed random source seeded from the session configuration.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a random source that replays the same stream for the same seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}
