//! Per-difficulty tuning tables.
//!
//! Every difficulty-dependent constant of the pipeline lives here: keep
//! probability for candidate pattern slots, tap-to-hold upgrade chance,
//! per-lane minimum gap, and the MIDI path's post-filter drop rate.

use stemchart_spec::Difficulty;

/// Probability that a candidate pattern slot becomes a note.
pub fn density(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.18,
        Difficulty::Medium => 0.45,
        Difficulty::Hard => 0.75,
        Difficulty::Expert => 1.0,
    }
}

/// Probability that a kept tap is upgraded to a hold.
pub fn hold_chance(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.0,
        Difficulty::Medium => 0.05,
        Difficulty::Hard => 0.14,
        Difficulty::Expert => 0.22,
    }
}

/// Hold length in beats for an upgraded tap.
pub fn hold_beats(difficulty: Difficulty) -> f64 {
    if difficulty == Difficulty::Expert {
        3.0
    } else {
        2.0
    }
}

/// Minimum same-lane spacing enforced by the shaping filter.
pub fn min_gap_ms(difficulty: Difficulty) -> i64 {
    match difficulty {
        Difficulty::Easy => 380,
        Difficulty::Medium => 260,
        Difficulty::Hard => 170,
        Difficulty::Expert => 90,
    }
}

/// Probability that a MIDI-derived note surviving the gap filter is still
/// discarded.
pub fn drop_rate(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.5,
        Difficulty::Medium => 0.35,
        Difficulty::Hard => 0.15,
        Difficulty::Expert => 0.0,
    }
}
