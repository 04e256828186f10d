//! Playable note types.

use serde::{Deserialize, Serialize};

/// Fixed lead-in applied to every note so the first note never arrives
/// before the client-side travel animation completes.
pub const NOTE_TRAVEL_MS: i64 = 1500;

/// Number of input columns.
pub const LANE_COUNT: u8 = 4;

/// Note articulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Single press.
    Tap,
    /// Sustained input from `timeMs` to `endTimeMs`.
    Hold,
}

impl NoteKind {
    /// Returns the note kind as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Tap => "tap",
            NoteKind::Hold => "hold",
        }
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One playable event.
///
/// `time_ms` is the onset, already shifted by [`NOTE_TRAVEL_MS`].
/// A hold's `end_time_ms` is always present and strictly greater than
/// `time_ms`, and is quantized identically to `time_ms` whenever
/// quantization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNote {
    /// Note onset in milliseconds, `>= 0`.
    pub time_ms: i64,

    /// Input column, `0..=3`.
    pub lane: u8,

    /// Tap or hold.
    #[serde(rename = "type")]
    pub kind: NoteKind,

    /// Hold release time; required when `kind` is [`NoteKind::Hold`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_ms: Option<i64>,

    /// Source MIDI pitch, retained for downstream stem filtering. Absent
    /// for procedurally synthesized notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<u8>,
}

impl RawNote {
    /// Creates a tap note.
    pub fn tap(time_ms: i64, lane: u8) -> Self {
        Self {
            time_ms,
            lane,
            kind: NoteKind::Tap,
            end_time_ms: None,
            pitch: None,
        }
    }

    /// Creates a hold note.
    pub fn hold(time_ms: i64, lane: u8, end_time_ms: i64) -> Self {
        Self {
            time_ms,
            lane,
            kind: NoteKind::Hold,
            end_time_ms: Some(end_time_ms),
            pitch: None,
        }
    }

    /// Attaches the source MIDI pitch.
    pub fn with_pitch(mut self, pitch: u8) -> Self {
        self.pitch = Some(pitch);
        self
    }

    /// Checks the structural invariants: lane range, non-negative onset,
    /// and hold well-formedness (`end_time_ms > time_ms`).
    pub fn is_well_formed(&self) -> bool {
        if self.time_ms < 0 || self.lane >= LANE_COUNT {
            return false;
        }
        match self.kind {
            NoteKind::Tap => true,
            NoteKind::Hold => self.end_time_ms.is_some_and(|end| end > self.time_ms),
        }
    }
}

/// Returns true when `notes` is non-decreasing in `time_ms`.
pub fn is_sorted_by_time(notes: &[RawNote]) -> bool {
    notes.windows(2).all(|w| w[0].time_ms <= w[1].time_ms)
}
