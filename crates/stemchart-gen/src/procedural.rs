//! Procedural chart synthesis from tempo and duration alone.
//!
//! This is the last-resort strategy: when no stored chart and no MIDI
//! transcription exist, a full note sequence is synthesized from BPM,
//! duration, and difficulty using the seeded pattern core. The output is
//! fully deterministic for a given `(trackId, difficulty, bpm, durationMs,
//! offsetMs)` tuple.

use stemchart_spec::{chart_seed, ChartFile, Difficulty, RawNote, DEFAULT_BPM, NOTE_TRAVEL_MS};

use crate::pattern::pattern_for_bar;
use crate::rng::ChartRng;
use crate::shape::shape_for_difficulty;
use crate::tuning;

/// Minimum note count any procedural chart carries.
pub const MIN_NOTES: usize = 8;

/// Fallback spacing floor for the minimal evenly-spaced sequence.
const FALLBACK_MIN_SPACING_MS: f64 = 400.0;

/// Inputs to the procedural synthesizer.
#[derive(Debug, Clone)]
pub struct ProceduralParams {
    pub track_id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Track tempo; non-positive values fall back to [`DEFAULT_BPM`].
    pub bpm: f64,
    pub duration_ms: i64,
    pub difficulty: Difficulty,
    pub offset_ms: i64,
}

impl ProceduralParams {
    /// Creates params with no metadata and zero offset.
    pub fn new(track_id: impl Into<String>, bpm: f64, duration_ms: i64, difficulty: Difficulty) -> Self {
        Self {
            track_id: track_id.into(),
            title: None,
            artist: None,
            bpm,
            duration_ms,
            difficulty,
            offset_ms: 0,
        }
    }
}

/// Builds a complete single-difficulty chart from tempo and duration.
pub fn build_procedural_chart(params: &ProceduralParams) -> ChartFile {
    let bpm = if params.bpm > 0.0 {
        params.bpm
    } else {
        DEFAULT_BPM
    };
    // Clamp degenerate tempos so note density stays playable.
    let beat_ms = 60_000.0 / bpm.max(60.0);

    // A negative offset larger than the lead-in would push notes before
    // time zero; the start is floored there instead.
    let start_at = (NOTE_TRAVEL_MS + params.offset_ms).max(0);
    let total_beats = ((params.duration_ms as f64 / beat_ms).floor() as i64).max(8);
    let bars = (total_beats as f64 / 4.0).ceil() as usize;

    let seed = chart_seed(&params.track_id, params.difficulty);
    let mut rng = ChartRng::new(seed);

    let density = tuning::density(params.difficulty);
    let hold_chance = tuning::hold_chance(params.difficulty);
    let hold_ms = (beat_ms * tuning::hold_beats(params.difficulty)).round() as i64;
    let chords = matches!(params.difficulty, Difficulty::Hard | Difficulty::Expert);

    let mut notes = Vec::new();
    for bar in 0..bars {
        let bar_offset_beats = bar as f64 * 4.0;
        let pattern = pattern_for_bar(seed, bar);

        for (beat, lane) in pattern.beats.iter().zip(pattern.lanes) {
            if rng.next() > density {
                continue;
            }
            let time_ms = (start_at as f64 + (bar_offset_beats + beat) * beat_ms).round() as i64;
            if rng.next() < hold_chance {
                notes.push(RawNote::hold(time_ms, *lane, time_ms + hold_ms));
            } else {
                notes.push(RawNote::tap(time_ms, *lane));
            }
        }

        // Hard/expert bars get a 50% chance of an extra outer-lane chord
        // on the downbeat, independent of the template.
        if chords && rng.next() < 0.5 {
            let time_ms = (start_at as f64 + bar_offset_beats * beat_ms).round() as i64;
            notes.push(RawNote::tap(time_ms, 0));
            notes.push(RawNote::tap(time_ms, 3));
        }
    }

    // Degenerate-output guard: very short or very sparse tracks regenerate
    // as a minimal evenly spaced sequence so every chart stays playable.
    if notes.len() < MIN_NOTES {
        notes = fallback_sequence(start_at, beat_ms);
    }

    notes.sort_by_key(|n| n.time_ms);
    let notes = shape_for_difficulty(notes, params.difficulty);

    ChartFile {
        song_id: params.track_id.clone(),
        title: params.title.clone(),
        artist: params.artist.clone(),
        bpm,
        offset_ms: params.offset_ms,
        difficulty: Some(params.difficulty),
        notes,
        stems: None,
    }
}

/// Exactly [`MIN_NOTES`] evenly spaced taps cycling lanes 0-3.
fn fallback_sequence(start_at: i64, beat_ms: f64) -> Vec<RawNote> {
    let spacing = (beat_ms * 2.0).max(FALLBACK_MIN_SPACING_MS);
    (0..MIN_NOTES)
        .map(|i| {
            let time_ms = (start_at as f64 + i as f64 * spacing).round() as i64;
            RawNote::tap(time_ms, (i % 4) as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stemchart_spec::is_sorted_by_time;

    fn params(difficulty: Difficulty) -> ProceduralParams {
        ProceduralParams::new("t1", 120.0, 30_000, difficulty)
    }

    #[test]
    fn test_determinism() {
        let a = build_procedural_chart(&params(Difficulty::Hard));
        let b = build_procedural_chart(&params(Difficulty::Hard));
        assert_eq!(a.notes, b.notes);
    }

    #[test]
    fn test_easy_scenario() {
        let chart = build_procedural_chart(&params(Difficulty::Easy));

        assert!(chart.notes.len() >= MIN_NOTES);
        assert!(chart.notes[0].time_ms >= NOTE_TRAVEL_MS);
        assert!(is_sorted_by_time(&chart.notes));

        // No two same-lane notes closer than the easy min gap.
        let mut last = [i64::MIN; 4];
        for note in &chart.notes {
            let lane = note.lane as usize;
            if last[lane] != i64::MIN {
                assert!(note.time_ms - last[lane] >= 380);
            }
            last[lane] = note.time_ms;
        }
    }

    #[test]
    fn test_all_notes_well_formed() {
        for difficulty in Difficulty::all() {
            let chart = build_procedural_chart(&params(*difficulty));
            for note in &chart.notes {
                assert!(note.is_well_formed(), "bad note: {:?}", note);
            }
        }
    }

    #[test]
    fn test_short_track_gets_fallback_floor() {
        let chart =
            build_procedural_chart(&ProceduralParams::new("tiny", 120.0, 500, Difficulty::Easy));
        assert!(chart.notes.len() >= MIN_NOTES);
        assert!(is_sorted_by_time(&chart.notes));
    }

    #[test]
    fn test_fallback_sequence_shape() {
        let notes = fallback_sequence(1500, 500.0);
        assert_eq!(notes.len(), MIN_NOTES);
        assert_eq!(notes[0].time_ms, 1500);
        // spacing = max(1000, 400) = 1000
        assert_eq!(notes[1].time_ms, 2500);
        let lanes: Vec<u8> = notes.iter().map(|n| n.lane).collect();
        assert_eq!(lanes, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn test_degenerate_bpm_is_clamped() {
        // 1 BPM clamps to 60; the chart still comes out playable.
        let chart =
            build_procedural_chart(&ProceduralParams::new("slow", 1.0, 60_000, Difficulty::Medium));
        assert_eq!(chart.bpm, 1.0);
        assert!(chart.notes.len() >= MIN_NOTES);
    }

    #[test]
    fn test_offset_shifts_start() {
        let mut p = params(Difficulty::Expert);
        p.offset_ms = 250;
        let chart = build_procedural_chart(&p);
        assert!(chart.notes[0].time_ms >= NOTE_TRAVEL_MS + 250);
        assert_eq!(chart.offset_ms, 250);
    }

    #[test]
    fn test_offset_below_lead_in_floors_at_zero() {
        let mut p = params(Difficulty::Expert);
        p.offset_ms = -5_000;
        let chart = build_procedural_chart(&p);
        assert!(!chart.notes.is_empty());
        for note in &chart.notes {
            assert!(note.is_well_formed(), "bad note: {:?}", note);
        }
        assert_eq!(chart.notes[0].time_ms, 0);
        assert_eq!(chart.offset_ms, -5_000);
    }

    #[test]
    fn test_expert_keeps_dense_output() {
        // Expert density is 1.0 and the override skips the gap filter, so
        // every templated slot (plus chords) survives.
        let chart = build_procedural_chart(&params(Difficulty::Expert));
        let easy = build_procedural_chart(&params(Difficulty::Easy));
        assert!(chart.notes.len() > easy.notes.len());
    }

    #[test]
    fn test_holds_end_after_start() {
        let chart = build_procedural_chart(&params(Difficulty::Expert));
        for note in &chart.notes {
            if let Some(end) = note.end_time_ms {
                assert!(end > note.time_ms);
            }
        }
    }
}
