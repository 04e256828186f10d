//! Collaborator capability interfaces and their filesystem defaults.
//!
//! The orchestrator never touches the filesystem directly; it talks to an
//! audio source (track location + metadata), a MIDI source (transcription
//! lookup), and an AI engine through the traits in this module. Each call
//! yields a [`SourceResult`], so a missing collaborator is a soft miss
//! that falls through to the next strategy instead of an error.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};

use stemchart_gen::{MidiNoteEvent, ParsedMidi};
use stemchart_spec::{sanitize_id, ChartFile, Difficulty, Stem};

/// Audio file extensions probed by [`FsAudioSource::locate`].
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// Outcome of asking a collaborator for something.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult<T> {
    /// The collaborator produced a value.
    Ok(T),
    /// The collaborator has nothing for this track; try the next strategy.
    Unavailable,
    /// The collaborator exists but broke; logged, then treated as a miss.
    Failed(String),
}

impl<T> SourceResult<T> {
    /// Converts to `Option`, dropping the failure message.
    pub fn ok(self) -> Option<T> {
        match self {
            SourceResult::Ok(value) => Some(value),
            _ => None,
        }
    }
}

/// Track metadata as read from a sidecar file or an upstream catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

/// Locates a track's audio file and its metadata.
pub trait AudioSource {
    /// Path of the track's audio file, if one exists.
    fn locate(&self, track_id: &str) -> SourceResult<PathBuf>;

    /// Metadata for the track.
    fn metadata(&self, track_id: &str) -> SourceResult<TrackMetadata>;
}

/// A MIDI transcription found on disk for one track/stem request.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiLookup {
    pub midi: ParsedMidi,
    /// Whether the file was an isolated recording of the requested stem
    /// (named per-stem) rather than a whole-song transcription.
    pub stem_specific: bool,
    pub path: PathBuf,
}

/// Finds and parses MIDI transcriptions.
pub trait MidiSource {
    fn load(&self, track_id: &str, stem: Stem) -> SourceResult<MidiLookup>;
}

/// Requested AI generation fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    #[default]
    Balanced,
    High,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Balanced => "balanced",
            QualityLevel::High => "high",
        }
    }
}

impl FromStr for QualityLevel {
    type Err = std::convert::Infallible;

    /// Permissive: anything that isn't `"high"` means balanced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(QualityLevel::High),
            _ => Ok(QualityLevel::Balanced),
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the AI engine is asked to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub track_id: String,
    pub stem: Stem,
    pub difficulty: Difficulty,
    /// Whether the client explicitly asked for AI analysis. Engines may
    /// fall back to cheaper onset detection when this is off.
    pub ai_requested: bool,
    pub quality: QualityLevel,
    pub offset_ms: i64,
}

/// An AI-generated chart plus its self-reported quality metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct AiChart {
    pub chart: ChartFile,
    pub quality_metrics: Option<serde_json::Value>,
}

/// Generates charts from audio analysis. Implementations live outside
/// this crate; the orchestrator only needs the interface.
pub trait AiEngine {
    fn generate(&self, config: &AiConfig) -> SourceResult<AiChart>;
}

/// The default engine: no AI backend configured, always unavailable.
#[derive(Debug, Default)]
pub struct NullAiEngine;

impl AiEngine for NullAiEngine {
    fn generate(&self, _config: &AiConfig) -> SourceResult<AiChart> {
        SourceResult::Unavailable
    }
}

/// Filesystem audio source: audio files and `<id>.meta.json` sidecars in
/// one directory.
pub struct FsAudioSource {
    audio_dir: PathBuf,
}

impl FsAudioSource {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
        }
    }
}

impl AudioSource for FsAudioSource {
    fn locate(&self, track_id: &str) -> SourceResult<PathBuf> {
        let id = sanitize_id(track_id);
        for ext in AUDIO_EXTENSIONS {
            let path = self.audio_dir.join(format!("{}.{}", id, ext));
            if path.exists() {
                return SourceResult::Ok(path);
            }
        }
        SourceResult::Unavailable
    }

    fn metadata(&self, track_id: &str) -> SourceResult<TrackMetadata> {
        let path = self
            .audio_dir
            .join(format!("{}.meta.json", sanitize_id(track_id)));
        if !path.exists() {
            return SourceResult::Unavailable;
        }
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => return SourceResult::Failed(format!("{}: {}", path.display(), e)),
        };
        match serde_json::from_str(&json) {
            Ok(metadata) => SourceResult::Ok(metadata),
            Err(e) => SourceResult::Failed(format!("{}: {}", path.display(), e)),
        }
    }
}

/// Filesystem MIDI source: per-stem and whole-song `.mid` files in one
/// directory.
pub struct FsMidiSource {
    midi_dir: PathBuf,
}

impl FsMidiSource {
    pub fn new(midi_dir: impl Into<PathBuf>) -> Self {
        Self {
            midi_dir: midi_dir.into(),
        }
    }

    /// Candidate files in priority order, paired with whether the file is
    /// stem-specific. Melody falls back to "other" and "bass" stems, which
    /// common separation models emit instead of a melody track.
    fn candidates(&self, track_id: &str, stem: Stem) -> Vec<(PathBuf, bool)> {
        let id = sanitize_id(track_id);
        let mut candidates = vec![(
            self.midi_dir.join(format!("{}_{}.mid", id, stem.as_str())),
            true,
        )];
        if stem == Stem::Melody {
            candidates.push((self.midi_dir.join(format!("{}_other.mid", id)), true));
            candidates.push((self.midi_dir.join(format!("{}_bass.mid", id)), true));
        }
        candidates.push((self.midi_dir.join(format!("{}.mid", id)), false));
        candidates
    }
}

impl MidiSource for FsMidiSource {
    fn load(&self, track_id: &str, stem: Stem) -> SourceResult<MidiLookup> {
        for (path, stem_specific) in self.candidates(track_id, stem) {
            if !path.exists() {
                continue;
            }
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => return SourceResult::Failed(format!("{}: {}", path.display(), e)),
            };
            return match parse_midi(&bytes) {
                Ok(midi) => SourceResult::Ok(MidiLookup {
                    midi,
                    stem_specific,
                    path,
                }),
                Err(e) => SourceResult::Failed(format!("{}: {}", path.display(), e)),
            };
        }
        SourceResult::Unavailable
    }
}

/// Parses a standard MIDI file into the flat note list the extractor
/// consumes.
///
/// Uses the file's first tempo event for the whole timeline (charts this
/// pipeline consumes are single-tempo transcriptions) and only supports
/// metrical (PPQ) timing.
pub fn parse_midi(bytes: &[u8]) -> Result<ParsedMidi, String> {
    let smf = Smf::parse(bytes).map_err(|e| format!("not a valid MIDI file: {}", e))?;

    let ppq = match smf.header.timing {
        Timing::Metrical(t) => t.as_int() as f64,
        Timing::Timecode(..) => return Err("SMPTE-timed MIDI files are not supported".into()),
    };

    // First tempo event wins; 120 BPM when the file carries none.
    let mut tempo_us: f64 = 500_000.0;
    let mut bpm = None;
    'scan: for track in &smf.tracks {
        for event in track {
            if let TrackEventKind::Meta(MetaMessage::Tempo(t)) = event.kind {
                tempo_us = t.as_int() as f64;
                bpm = Some(60_000_000.0 / tempo_us);
                break 'scan;
            }
        }
    }
    let sec_per_tick = tempo_us / (ppq * 1_000_000.0);

    let mut notes = Vec::new();
    for track in &smf.tracks {
        let mut abs_ticks: u64 = 0;
        // Open note-on tick per pitch; note-off (or note-on at velocity
        // zero) closes it.
        let mut open: [Option<u64>; 128] = [None; 128];

        for event in track {
            abs_ticks += u64::from(event.delta.as_int());
            let TrackEventKind::Midi { message, .. } = event.kind else {
                continue;
            };
            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    open[key.as_int() as usize] = Some(abs_ticks);
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    if let Some(start) = open[key.as_int() as usize].take() {
                        notes.push(MidiNoteEvent {
                            start_sec: start as f64 * sec_per_tick,
                            duration_sec: abs_ticks.saturating_sub(start) as f64 * sec_per_tick,
                            pitch: key.as_int(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    notes.sort_by(|a, b| a.start_sec.total_cmp(&b.start_sec));
    Ok(ParsedMidi { bpm, notes })
}

/// Default directory for a content kind under the platform data dir.
pub fn default_content_dir(kind: &str) -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("stemchart").join(kind))
}
