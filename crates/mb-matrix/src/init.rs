use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{MatrixError, Result};
use crate::matrix::SquareMatrix;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 12345;

/// Fill A and B with reproducible pseudo-random values in `0.0..=9.9`.
///
/// A single `StdRng` seeded with `seed` is drawn element by element,
/// alternating A then B, so the same seed always yields the same pair of
/// matrices regardless of where they are allocated.
///
/// # Errors
/// Returns `LengthMismatch` if the two matrices differ in size.
pub fn fill_seeded(a: &mut SquareMatrix, b: &mut SquareMatrix, seed: u64) -> Result<()> {
    if a.len() != b.len() {
        return Err(MatrixError::LengthMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    for (x, y) in a.as_mut_slice().iter_mut().zip(b.as_mut_slice().iter_mut()) {
        *x = rng.gen_range(0..100) as f64 / 10.0;
        *y = rng.gen_range(0..100) as f64 / 10.0;
    }
    Ok(())
}
