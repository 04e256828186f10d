//! Difficulty shaping: per-lane minimum-gap enforcement and probabilistic
//! thinning.
//!
//! Both synthesizers run their output through [`enforce_min_gap`]; the
//! MIDI path additionally applies [`apply_drop_rate`]. Input must already
//! be sorted ascending by `time_ms`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use stemchart_spec::{Difficulty, RawNote, LANE_COUNT};

use crate::tuning;

/// Randomness source for the MIDI drop-rate thinning.
///
/// The original pipeline drew from process randomness here while every
/// other draw was seeded, so MIDI-derived charts were not reproducible
/// across regenerations. That behavior is preserved as the default;
/// `Seeded` derives a PCG32 stream from the chart seed instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thinning {
    /// Fresh process randomness per request (source-faithful).
    Unseeded,
    /// Deterministic stream derived from the chart seed.
    Seeded(u32),
}

/// Enforces a per-lane minimum gap between consecutive notes.
///
/// A note is accepted when `time_ms - last_for_lane >= min_gap_ms`.
/// When `allow_expert_override` is set and the difficulty is expert, every
/// note passes regardless of spacing — expert charts are never thinned for
/// readability, only lower tiers are.
pub fn enforce_min_gap(
    notes: Vec<RawNote>,
    min_gap_ms: i64,
    difficulty: Difficulty,
    allow_expert_override: bool,
) -> Vec<RawNote> {
    if allow_expert_override && difficulty == Difficulty::Expert {
        return notes;
    }

    let mut last_for_lane = [i64::MIN; LANE_COUNT as usize];
    let mut kept = Vec::with_capacity(notes.len());

    for note in notes {
        let lane = note.lane as usize % last_for_lane.len();
        let last = last_for_lane[lane];
        // i64::MIN means no prior note on this lane; subtraction would
        // overflow, so compare via saturation.
        if note.time_ms.saturating_sub(last) >= min_gap_ms {
            last_for_lane[lane] = note.time_ms;
            kept.push(note);
        }
    }

    kept
}

/// Shapes `notes` with the standard min-gap table for `difficulty`.
pub fn shape_for_difficulty(notes: Vec<RawNote>, difficulty: Difficulty) -> Vec<RawNote> {
    enforce_min_gap(notes, tuning::min_gap_ms(difficulty), difficulty, true)
}

/// Discards each note with probability `drop_rate(difficulty)`.
///
/// Applied by the MIDI path after the gap filter. Expert's drop rate is
/// zero, so expert charts pass through untouched.
pub fn apply_drop_rate(
    notes: Vec<RawNote>,
    difficulty: Difficulty,
    thinning: Thinning,
) -> Vec<RawNote> {
    let rate = tuning::drop_rate(difficulty);
    if rate <= 0.0 {
        return notes;
    }

    match thinning {
        Thinning::Unseeded => {
            let mut rng = rand::thread_rng();
            notes
                .into_iter()
                .filter(|_| rng.gen::<f64>() >= rate)
                .collect()
        }
        Thinning::Seeded(seed) => {
            let mut rng = Pcg32::seed_from_u64((seed as u64) | ((seed as u64) << 32));
            notes
                .into_iter()
                .filter(|_| rng.gen::<f64>() >= rate)
                .collect()
        }
    }
}
