//! Fixed rhythmic pattern library.
//!
//! Five templates over a 4-beat bar, ordered sparse to dense. Bar `i` of a
//! chart uses `PATTERNS[(seed + i) % PATTERNS.len()]`, so the template
//! sequence is deterministic per seed but varies across bars.

/// One bar template: beat offsets within a 4-beat bar and the lane each
/// offset lands on. `beats` and `lanes` always have equal length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPattern {
    /// Beat offsets in `[0, 4)`; fractional offsets are off-beats.
    pub beats: &'static [f64],
    /// Lane per beat offset.
    pub lanes: &'static [u8],
}

/// The fixed, ordered pattern library.
pub const PATTERNS: [BarPattern; 5] = [
    // Half notes on the outer lanes.
    BarPattern {
        beats: &[0.0, 2.0],
        lanes: &[0, 3],
    },
    // Straight quarters walking across the lanes.
    BarPattern {
        beats: &[0.0, 1.0, 2.0, 3.0],
        lanes: &[0, 1, 2, 3],
    },
    // Syncopated inner-lane pair.
    BarPattern {
        beats: &[0.0, 1.5, 2.0, 3.5],
        lanes: &[1, 2, 1, 2],
    },
    // Gallop figure with a back-beat answer.
    BarPattern {
        beats: &[0.0, 0.5, 1.0, 2.0, 2.5, 3.0],
        lanes: &[0, 1, 0, 3, 2, 3],
    },
    // Dense off-beat run.
    BarPattern {
        beats: &[0.0, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5],
        lanes: &[2, 0, 1, 3, 1, 0, 2],
    },
];

/// Selects the template for bar `bar` under `seed`.
pub fn pattern_for_bar(seed: u32, bar: usize) -> &'static BarPattern {
    let index = (seed as usize).wrapping_add(bar) % PATTERNS.len();
    &PATTERNS[index]
}
