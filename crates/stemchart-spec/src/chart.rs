//! Canonical chart document types.
//!
//! Stored charts exist in two wire shapes: a flat single-difficulty note
//! list (legacy) and a nested per-stem/per-difficulty document. Both are
//! resolved once at load time into the canonical [`ChartFile`]; the rest of
//! the pipeline never branches on shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::note::RawNote;
use crate::stem::Stem;

/// Assumed tempo when a track's BPM is unknown.
pub const DEFAULT_BPM: f64 = 120.0;

fn default_bpm() -> f64 {
    DEFAULT_BPM
}

/// Notes for one difficulty of one stem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyChart {
    /// Notes sorted ascending by `timeMs`.
    pub notes: Vec<RawNote>,
}

/// Per-stem block of a multi-instrument chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StemBlock {
    /// Notes per difficulty name. Absent/empty difficulties are legal.
    #[serde(default)]
    pub difficulties: BTreeMap<String, DifficultyChart>,

    /// Source MIDI file path, when the block was derived from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi_file: Option<String>,
}

/// The canonical chart document.
///
/// Exactly one of `notes` (legacy flat chart) and `stems` (nested chart)
/// is expected to be populated, but both being present is tolerated; the
/// nested shape wins during note selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFile {
    /// Track identity.
    #[serde(alias = "trackId")]
    pub song_id: String,

    #[serde(default, alias = "songName", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    /// Track tempo; defaults to [`DEFAULT_BPM`] when unknown.
    #[serde(default = "default_bpm")]
    pub bpm: f64,

    /// Authoring/audio sync offset.
    #[serde(default, alias = "audioOffsetMs")]
    pub offset_ms: i64,

    /// Present for single-difficulty charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    /// Flat note list for single-difficulty/legacy charts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<RawNote>,

    /// Nested per-stem blocks for richer multi-instrument charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stems: Option<BTreeMap<String, StemBlock>>,
}

impl ChartFile {
    /// Creates an empty legacy chart for a track.
    pub fn new(song_id: impl Into<String>) -> Self {
        Self {
            song_id: song_id.into(),
            title: None,
            artist: None,
            bpm: DEFAULT_BPM,
            offset_ms: 0,
            difficulty: None,
            notes: Vec::new(),
            stems: None,
        }
    }

    /// Selects the note list for a stem/difficulty request.
    ///
    /// Nested charts require an exact stem block; the difficulty lookup
    /// accepts the legacy `"normal"` key as an alias of `medium`. Flat
    /// charts match any stem, and any difficulty when the chart does not
    /// declare one.
    pub fn notes_for(&self, stem: Stem, difficulty: Difficulty) -> Option<&[RawNote]> {
        if let Some(stems) = &self.stems {
            let block = stems.get(stem.as_str())?;
            let chart = block.difficulties.get(difficulty.as_str()).or_else(|| {
                if difficulty == Difficulty::Medium {
                    block.difficulties.get("normal")
                } else {
                    None
                }
            })?;
            return Some(&chart.notes);
        }

        if self.notes.is_empty() {
            return None;
        }
        match self.difficulty {
            Some(d) if d != difficulty => None,
            _ => Some(&self.notes),
        }
    }

    /// Structural cache-hit check: does this stored chart carry notes for
    /// the requested stem and difficulty?
    pub fn matches(&self, stem: Stem, difficulty: Difficulty) -> bool {
        self.notes_for(stem, difficulty).is_some()
    }

    /// Parses a chart from either stored wire shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let stored: StoredChart = serde_json::from_str(json)?;
        Ok(stored.into_canonical())
    }

    /// Serializes the canonical chart to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Inserts notes for one stem/difficulty, creating the nested block
    /// on demand. Used when authoring multi-stem chart files.
    pub fn insert_stem_notes(&mut self, stem: Stem, difficulty: Difficulty, notes: Vec<RawNote>) {
        let stems = self.stems.get_or_insert_with(BTreeMap::new);
        let block = stems
            .entry(stem.as_str().to_string())
            .or_insert_with(|| StemBlock {
                difficulties: BTreeMap::new(),
                midi_file: None,
            });
        block
            .difficulties
            .insert(difficulty.as_str().to_string(), DifficultyChart { notes });
    }
}

/// A stored chart in one of the two persisted shapes.
///
/// Variant order matters: the nested shape is tried first because the
/// legacy shape would otherwise swallow any document with a `notes` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredChart {
    /// Nested per-stem/per-difficulty document.
    Stems(StemChartDoc),
    /// Flat single-difficulty note list.
    Legacy(LegacyChartDoc),
}

/// Wire form of a nested multi-stem chart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StemChartDoc {
    #[serde(alias = "trackId")]
    pub song_id: String,
    #[serde(default, alias = "songName")]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    #[serde(default, alias = "audioOffsetMs")]
    pub offset_ms: i64,
    pub stems: BTreeMap<String, StemBlock>,
}

/// Wire form of a flat legacy chart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyChartDoc {
    #[serde(alias = "trackId")]
    pub song_id: String,
    #[serde(default, alias = "songName")]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    #[serde(default, alias = "audioOffsetMs")]
    pub offset_ms: i64,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub notes: Vec<RawNote>,
}

impl StoredChart {
    /// Resolves either wire shape into the canonical [`ChartFile`].
    pub fn into_canonical(self) -> ChartFile {
        match self {
            StoredChart::Stems(doc) => ChartFile {
                song_id: doc.song_id,
                title: doc.title,
                artist: doc.artist,
                bpm: doc.bpm,
                offset_ms: doc.offset_ms,
                difficulty: None,
                notes: Vec::new(),
                stems: Some(doc.stems),
            },
            StoredChart::Legacy(doc) => ChartFile {
                song_id: doc.song_id,
                title: doc.title,
                artist: doc.artist,
                bpm: doc.bpm,
                offset_ms: doc.offset_ms,
                difficulty: doc.difficulty,
                notes: doc.notes,
                stems: None,
            },
        }
    }
}
