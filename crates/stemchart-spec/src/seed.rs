//! Chart seed derivation.
//!
//! Regenerating a chart for the same track and difficulty must yield the
//! same note skeleton, independent of request timing. The seed is derived
//! deterministically from the string `"<trackId>-<difficulty>"` with a
//! polynomial rolling hash on wrapping 32-bit arithmetic
//! (`acc = (acc << 5) - acc + code`), then the absolute value is taken.

use crate::difficulty::Difficulty;

/// Derives the chart seed for a track/difficulty pair.
pub fn chart_seed(track_id: &str, difficulty: Difficulty) -> u32 {
    let input = format!("{}-{}", track_id, difficulty.as_str());
    rolling_hash(&input)
}

/// Polynomial rolling hash over UTF-16 code units, absolute value taken.
pub fn rolling_hash(s: &str) -> u32 {
    let mut acc: i32 = 0;
    for code in s.encode_utf16() {
        acc = acc
            .wrapping_shl(5)
            .wrapping_sub(acc)
            .wrapping_add(code as i32);
    }
    acc.unsigned_abs()
}
