//! Deterministic RNG utilities for reproducible tests.

use nalgebra::DVector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Deterministic state/input vector with components in `[-1, 1)`.
pub fn deterministic_vector(dim: usize, seed: u64) -> DVector<f64> {
    let mut rng = seeded_rng(seed);
    DVector::from_fn(dim, |_, _| rng.gen_range(-1.0..1.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
