//! Client-facing response shapes.
//!
//! Whatever strategy produced the chart, the client sees one shape. The
//! two error bodies intentionally carry an empty `notes` array so naive
//! clients can always iterate it.

use serde::{Deserialize, Serialize};

use stemchart_spec::{ChartFile, Difficulty, RawNote, Stem};

/// A successfully resolved chart, flattened for one stem/difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub song_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    pub bpm: f64,
    pub offset_ms: i64,

    /// Difficulty actually served.
    pub difficulty: Difficulty,

    pub notes: Vec<RawNote>,

    pub requested_difficulty: Difficulty,
    pub requested_stem: Stem,

    /// Present (and `true`) only for revolutionary-engine charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revolutionary: Option<bool>,

    /// Whether the AI engine produced this chart.
    #[serde(
        default,
        rename = "ai_powered",
        skip_serializing_if = "Option::is_none"
    )]
    pub ai_powered: Option<bool>,

    /// Engine-reported quality metrics, passed through verbatim.
    #[serde(
        default,
        rename = "quality_metrics",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality_metrics: Option<serde_json::Value>,
}

impl ChartResponse {
    /// Flattens a canonical chart into a response for one request.
    /// Returns `None` when the chart carries no notes for the requested
    /// stem/difficulty.
    pub fn from_chart(chart: &ChartFile, stem: Stem, difficulty: Difficulty) -> Option<Self> {
        let notes = chart.notes_for(stem, difficulty)?.to_vec();
        Some(Self {
            song_id: chart.song_id.clone(),
            title: chart.title.clone(),
            artist: chart.artist.clone(),
            bpm: chart.bpm,
            offset_ms: chart.offset_ms,
            difficulty,
            notes,
            requested_difficulty: difficulty,
            requested_stem: stem,
            revolutionary: None,
            ai_powered: None,
            quality_metrics: None,
        })
    }

    /// Marks the response as revolutionary-engine output.
    pub fn with_revolutionary(mut self) -> Self {
        self.revolutionary = Some(true);
        self
    }

    /// Attaches AI provenance and metrics.
    pub fn with_ai(mut self, quality_metrics: Option<serde_json::Value>) -> Self {
        self.ai_powered = Some(true);
        self.quality_metrics = quality_metrics;
        self
    }
}

/// Body served when no chart could be found or generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Always empty; kept so clients can iterate notes unconditionally.
    pub notes: Vec<RawNote>,
}

impl ErrorResponse {
    /// Cache miss with auto-generation disabled.
    pub fn not_found() -> Self {
        Self {
            error: "Chart not found".to_string(),
            notes: Vec::new(),
        }
    }

    /// Every strategy failed.
    pub fn generation_failed() -> Self {
        Self {
            error: "Unable to generate chart".to_string(),
            notes: Vec::new(),
        }
    }

    /// A stored chart exists but could not be read or decoded.
    pub fn load_failed() -> Self {
        Self {
            error: "Failed to load chart".to_string(),
            notes: Vec::new(),
        }
    }
}
