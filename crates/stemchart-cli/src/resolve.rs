//! Chart resolution orchestration.
//!
//! One request walks a fixed strategy ladder: stored chart, then (when
//! asked for) the AI engine, then a MIDI transcription, then procedural
//! synthesis. Degradation is one-directional; nothing retries. A store
//! write failure never aborts a response — the freshly generated chart
//! is served anyway and the failure is logged.
//!
//! There is no cross-request locking: two concurrent first requests for
//! the same track may both generate, and the last write wins. Generation
//! is deterministic, so both writers produce the same procedural chart.

use log::{debug, error, warn};

use stemchart_gen::{build_procedural_chart, extract_notes, ProceduralParams, Thinning};
use stemchart_spec::{
    chart_key, legacy_key, revolutionary_key, ChartError, ChartFile, Difficulty, Stem, DEFAULT_BPM,
};

use crate::response::{ChartResponse, ErrorResponse};
use crate::sources::{AiConfig, AiEngine, AudioSource, MidiSource, QualityLevel, SourceResult};
use crate::store::ChartStore;

/// Assumed track length when metadata is missing: three minutes.
pub const DEFAULT_DURATION_MS: i64 = 180_000;

/// One chart request.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub track_id: String,
    pub stem: Stem,
    pub difficulty: Difficulty,
    /// Whether a cache miss may fall through to generation.
    pub auto_allowed: bool,
    pub offset_ms: i64,
    /// Bypass the stored chart and ask the AI engine for a fresh one.
    pub revolutionary: bool,
    /// Whether the client explicitly asked for AI analysis; forwarded to
    /// the engine config together with the quality level.
    pub ai_requested: bool,
    pub quality: QualityLevel,
}

impl ResolveRequest {
    /// A default request: melody, medium, auto-generation allowed.
    pub fn new(track_id: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            stem: Stem::default(),
            difficulty: Difficulty::Medium,
            auto_allowed: true,
            offset_ms: 0,
            revolutionary: false,
            ai_requested: false,
            quality: QualityLevel::default(),
        }
    }
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A chart was found or generated.
    Served(ChartResponse),
    /// Cache miss with generation disallowed.
    NotFound(ErrorResponse),
    /// Every strategy failed.
    Failed(ErrorResponse),
}

impl Outcome {
    pub fn is_served(&self) -> bool {
        matches!(self, Outcome::Served(_))
    }

    /// Serializes whichever body this outcome carries.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        match self {
            Outcome::Served(response) => serde_json::to_string_pretty(response),
            Outcome::NotFound(body) | Outcome::Failed(body) => serde_json::to_string_pretty(body),
        }
    }
}

/// What the stored-chart lookup found.
enum Lookup {
    Hit(ChartResponse),
    Miss,
    /// At least one candidate entry exists but could not be read.
    LoadError,
}

/// The strategy ladder, parameterized over its collaborators.
pub struct Resolver<'a> {
    store: &'a dyn ChartStore,
    audio: &'a dyn AudioSource,
    midi: &'a dyn MidiSource,
    ai: &'a dyn AiEngine,
    thinning: Thinning,
}

impl<'a> Resolver<'a> {
    pub fn new(
        store: &'a dyn ChartStore,
        audio: &'a dyn AudioSource,
        midi: &'a dyn MidiSource,
        ai: &'a dyn AiEngine,
    ) -> Self {
        Self {
            store,
            audio,
            midi,
            ai,
            thinning: Thinning::Unseeded,
        }
    }

    /// Overrides the MIDI drop-rate randomness source.
    pub fn with_thinning(mut self, thinning: Thinning) -> Self {
        self.thinning = thinning;
        self
    }

    /// Resolves one request. `Err` is reserved for invalid input; every
    /// internal failure becomes an [`Outcome`].
    pub fn resolve(&self, req: &ResolveRequest) -> Result<Outcome, ChartError> {
        if req.track_id.trim().is_empty() {
            return Err(ChartError::Input("trackId is required".to_string()));
        }

        let keyed = chart_key(&req.track_id, req.stem, req.difficulty);
        let legacy = legacy_key(&req.track_id);

        let lookup = if req.revolutionary {
            Lookup::Miss
        } else {
            self.lookup_stored(&[&keyed, &legacy], req)
        };
        let load_error = match lookup {
            Lookup::Hit(response) => {
                debug!("serving stored chart for {}", keyed);
                return Ok(Outcome::Served(response));
            }
            Lookup::LoadError => true,
            Lookup::Miss => false,
        };

        if !req.auto_allowed && !req.revolutionary {
            // With generation off there is nothing to overwrite a broken
            // entry with, so a load failure is reported as such rather
            // than as a plain miss.
            return Ok(if load_error {
                Outcome::Failed(ErrorResponse::load_failed())
            } else {
                Outcome::NotFound(ErrorResponse::not_found())
            });
        }

        match self.generate(req, &keyed, &legacy) {
            Ok(response) => Ok(Outcome::Served(response)),
            Err(e) => {
                error!("chart generation failed for {}: {}", req.track_id, e);
                Ok(Outcome::Failed(ErrorResponse::generation_failed()))
            }
        }
    }

    /// Structural cache lookup over the candidate keys. When generation
    /// is allowed an unreadable entry is just regenerated over, so the
    /// error is demoted; the caller decides what a `LoadError` means.
    fn lookup_stored(&self, keys: &[&str], req: &ResolveRequest) -> Lookup {
        let mut load_error = false;
        for key in keys {
            match self.store.get(key) {
                Ok(Some(chart)) if chart.matches(req.stem, req.difficulty) => {
                    if let Some(response) =
                        ChartResponse::from_chart(&chart, req.stem, req.difficulty)
                    {
                        return Lookup::Hit(response);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("unreadable stored chart {}: {}", key, e);
                    load_error = true;
                }
            }
        }
        if load_error {
            Lookup::LoadError
        } else {
            Lookup::Miss
        }
    }

    /// AI, then MIDI, then procedural.
    fn generate(
        &self,
        req: &ResolveRequest,
        keyed: &str,
        legacy: &str,
    ) -> Result<ChartResponse, ChartError> {
        if req.revolutionary {
            if let Some(response) = self.try_ai(req) {
                return Ok(response);
            }
        }

        if let Some(response) = self.try_midi(req, keyed, legacy) {
            return Ok(response);
        }

        self.procedural(req, keyed, legacy)
    }

    fn try_ai(&self, req: &ResolveRequest) -> Option<ChartResponse> {
        let config = AiConfig {
            track_id: req.track_id.clone(),
            stem: req.stem,
            difficulty: req.difficulty,
            ai_requested: req.ai_requested,
            quality: req.quality,
            offset_ms: req.offset_ms,
        };
        match self.ai.generate(&config) {
            SourceResult::Ok(ai_chart) => {
                let Some(response) =
                    ChartResponse::from_chart(&ai_chart.chart, req.stem, req.difficulty)
                else {
                    // An empty engine result must not leave a cached
                    // entry behind; fall through without persisting.
                    warn!("ai engine returned an empty chart for {}", req.track_id);
                    return None;
                };
                let rev_key = revolutionary_key(&req.track_id, req.stem, req.difficulty);
                self.persist(&[&rev_key], &ai_chart.chart);
                Some(response.with_revolutionary().with_ai(ai_chart.quality_metrics))
            }
            SourceResult::Unavailable => {
                warn!("ai engine unavailable for {}", req.track_id);
                None
            }
            SourceResult::Failed(msg) => {
                warn!("ai engine failed for {}: {}", req.track_id, msg);
                None
            }
        }
    }

    fn try_midi(&self, req: &ResolveRequest, keyed: &str, legacy: &str) -> Option<ChartResponse> {
        let lookup = match self.midi.load(&req.track_id, req.stem) {
            SourceResult::Ok(lookup) => lookup,
            SourceResult::Unavailable => {
                debug!("no midi transcription for {}", req.track_id);
                return None;
            }
            SourceResult::Failed(msg) => {
                warn!("midi source failed for {}: {}", req.track_id, msg);
                return None;
            }
        };

        let notes = extract_notes(
            &lookup.midi,
            req.stem,
            req.difficulty,
            lookup.stem_specific,
            self.thinning,
        );
        if notes.is_empty() {
            warn!(
                "midi transcription {} yielded no notes for {}/{}",
                lookup.path.display(),
                req.stem,
                req.difficulty
            );
            return None;
        }

        let metadata = self.audio.metadata(&req.track_id).ok().unwrap_or_default();
        let chart = ChartFile {
            song_id: req.track_id.clone(),
            title: metadata.title,
            artist: metadata.artist,
            bpm: lookup.midi.bpm.or(metadata.bpm).unwrap_or(DEFAULT_BPM),
            offset_ms: req.offset_ms,
            difficulty: Some(req.difficulty),
            notes,
            stems: None,
        };
        self.persist(&[keyed, legacy], &chart);
        ChartResponse::from_chart(&chart, req.stem, req.difficulty)
    }

    fn procedural(
        &self,
        req: &ResolveRequest,
        keyed: &str,
        legacy: &str,
    ) -> Result<ChartResponse, ChartError> {
        if let SourceResult::Unavailable = self.audio.locate(&req.track_id) {
            debug!("no audio file for {}; generating from defaults", req.track_id);
        }
        let metadata = match self.audio.metadata(&req.track_id) {
            SourceResult::Ok(metadata) => metadata,
            SourceResult::Unavailable => {
                warn!("no metadata for {}; using defaults", req.track_id);
                Default::default()
            }
            SourceResult::Failed(msg) => {
                warn!("metadata read failed for {}: {}", req.track_id, msg);
                Default::default()
            }
        };

        let params = ProceduralParams {
            track_id: req.track_id.clone(),
            title: metadata.title,
            artist: metadata.artist,
            bpm: metadata.bpm.unwrap_or(DEFAULT_BPM),
            duration_ms: metadata.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
            difficulty: req.difficulty,
            offset_ms: req.offset_ms,
        };
        let chart = build_procedural_chart(&params);
        self.persist(&[keyed, legacy], &chart);

        ChartResponse::from_chart(&chart, req.stem, req.difficulty).ok_or_else(|| {
            ChartError::Generation("synthesized chart carried no notes for request".to_string())
        })
    }

    /// Best-effort persistence under every key; serve-anyway on failure.
    fn persist(&self, keys: &[&str], chart: &ChartFile) {
        for key in keys {
            if let Err(e) = self.store.put(key, chart) {
                error!("failed to persist chart under {}: {}", key, e);
            }
        }
    }
}
