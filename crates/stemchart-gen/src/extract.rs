//! MIDI-derived chart extraction.
//!
//! Converts a parsed MIDI note list into game notes: pitch-to-lane
//! classification, stem-specific reshaping when the source file was not
//! already stem-specific, beat-grid quantization against the file's own
//! tempo, and difficulty shaping with drop-rate thinning.

use stemchart_spec::{Difficulty, NoteKind, RawNote, Stem, NOTE_TRAVEL_MS};

use crate::quantize::{quantize, DEFAULT_DIVISION};
use crate::shape::{apply_drop_rate, shape_for_difficulty, Thinning};

/// Vocal holds shorter than this are stretched to it.
const VOCAL_MIN_HOLD_MS: i64 = 120;

/// Duration assigned to vocal notes that carried no duration at all.
const VOCAL_DEFAULT_HOLD_MS: i64 = 180;

/// One note event from a MIDI transcription, already flattened across
/// tracks by the reader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiNoteEvent {
    /// Onset in seconds from the start of the file.
    pub start_sec: f64,
    /// Sounding length in seconds; zero means an untimed hit.
    pub duration_sec: f64,
    /// MIDI pitch, 0-127.
    pub pitch: u8,
}

/// A parsed MIDI transcription: the first tempo event (if any) and the
/// flattened note list.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMidi {
    /// Tempo from the first tempo event; `None` disables quantization.
    pub bpm: Option<f64>,
    pub notes: Vec<MidiNoteEvent>,
}

/// Classifies a MIDI pitch into one of the four lanes.
pub fn lane_for_pitch(pitch: u8) -> u8 {
    match pitch {
        0..=49 => 0,
        50..=59 => 1,
        60..=71 => 2,
        _ => 3,
    }
}

/// Extracts the playable note list for one stem/difficulty from a parsed
/// MIDI transcription.
///
/// `stem_specific` marks whether the source file was already an isolated
/// recording of the requested stem; reshaping heuristics only apply to
/// generic sources.
pub fn extract_notes(
    midi: &ParsedMidi,
    stem: Stem,
    difficulty: Difficulty,
    stem_specific: bool,
    thinning: Thinning,
) -> Vec<RawNote> {
    let mut notes: Vec<RawNote> = midi
        .notes
        .iter()
        .map(|event| {
            let time_ms = (event.start_sec * 1000.0).round() as i64 + NOTE_TRAVEL_MS;
            let duration_ms = (event.duration_sec * 1000.0).round() as i64;
            let note = if duration_ms > 0 {
                RawNote::hold(time_ms, lane_for_pitch(event.pitch), time_ms + duration_ms)
            } else {
                RawNote::tap(time_ms, lane_for_pitch(event.pitch))
            };
            note.with_pitch(event.pitch)
        })
        .collect();

    if !stem_specific {
        notes = reshape_for_stem(notes, stem);
    }

    for note in &mut notes {
        note.time_ms = quantize(note.time_ms, midi.bpm, DEFAULT_DIVISION);
        if let Some(end) = note.end_time_ms {
            note.end_time_ms = Some(quantize(end, midi.bpm, DEFAULT_DIVISION));
        }
    }
    // Quantization can collapse a short hold onto its own onset; such
    // notes degrade to taps rather than violating end > start.
    for note in &mut notes {
        if note.kind == NoteKind::Hold && note.end_time_ms.is_some_and(|end| end <= note.time_ms) {
            note.kind = NoteKind::Tap;
            note.end_time_ms = None;
        }
    }

    notes.sort_by_key(|n| n.time_ms);
    let notes = shape_for_difficulty(notes, difficulty);
    apply_drop_rate(notes, difficulty, thinning)
}

/// Stem heuristics for generic (non-stem-specific) MIDI sources.
fn reshape_for_stem(notes: Vec<RawNote>, stem: Stem) -> Vec<RawNote> {
    match stem {
        // Drums live in the low lanes and are never sustained.
        Stem::Drums => notes
            .into_iter()
            .filter(|n| n.lane <= 1 || n.pitch.is_some_and(|p| p < 60))
            .map(|mut n| {
                n.kind = NoteKind::Tap;
                n.end_time_ms = None;
                n
            })
            .collect(),

        Stem::Melody => notes
            .into_iter()
            .filter(|n| n.lane >= 2 || n.pitch.is_some_and(|p| p >= 60))
            .collect(),

        // Vocals become sustained holds in a narrow pitch band, spread
        // across lanes 2/3 in strict round-robin rather than by pitch.
        Stem::Vocals => notes
            .into_iter()
            .filter(|n| n.pitch.is_some_and(|p| (55..=80).contains(&p)))
            .enumerate()
            .map(|(i, mut n)| {
                let duration = match n.end_time_ms {
                    Some(end) => (end - n.time_ms).max(VOCAL_MIN_HOLD_MS),
                    None => VOCAL_DEFAULT_HOLD_MS,
                };
                n.kind = NoteKind::Hold;
                n.end_time_ms = Some(n.time_ms + duration);
                n.lane = 2 + (i % 2) as u8;
                n
            })
            .collect(),

        // No reshaping rule; pass through.
        Stem::Bass => notes,
    }
}
