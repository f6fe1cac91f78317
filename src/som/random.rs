//! Injectable source of uniform random numbers for grid initialization.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Something that yields independent uniform reals in `[0, 1)`.
///
/// Any [`rand::Rng`] qualifies. Tests can plug in a fixed sequence instead.
pub trait UniformSource {
    /// Returns the next value in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

impl<R: Rng> UniformSource for R {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Builds the default generator: seeded when `seed` is set, OS entropy otherwise.
pub fn seeded_source(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
