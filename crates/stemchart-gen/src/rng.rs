//! Deterministic RNG for pattern synthesis.
//!
//! All randomness in the procedural path flows through [`ChartRng`], a
//! Park-Miller linear congruential generator. The exact constants are part
//! of the reproducibility contract: regenerating a chart for the same
//! track and difficulty must yield the same note skeleton, so the
//! generator cannot be swapped for another PRNG without invalidating every
//! cached chart.

/// Park-Miller modulus, `2^31 - 1`.
const LCG_MODULUS: i64 = 2_147_483_647;

/// Park-Miller multiplier.
const LCG_MULTIPLIER: i64 = 16_807;

/// Minimal-standard LCG with state in `(0, 2^31 - 1)`.
#[derive(Debug, Clone)]
pub struct ChartRng {
    state: i64,
}

impl ChartRng {
    /// Creates a generator from a chart seed.
    ///
    /// The seed is folded into the open interval `(0, 2^31 - 1)`; a seed
    /// that folds to zero is bumped to keep the generator out of its
    /// fixed point.
    pub fn new(seed: u32) -> Self {
        let mut state = (seed as i64) % (LCG_MODULUS - 1);
        if state <= 0 {
            state += LCG_MODULUS - 2;
        }
        Self { state: state + 1 }
    }

    /// Returns the next value in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER) % LCG_MODULUS;
        (self.state - 1) as f64 / (LCG_MODULUS - 1) as f64
    }
}
