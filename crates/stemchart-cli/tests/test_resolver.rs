//! End-to-end resolution tests over in-memory collaborators.
//!
//! Each test wires the orchestrator to stub sources and walks one
//! strategy path: stored chart, not-found, MIDI extraction, procedural
//! fallback, revolutionary regeneration, and serve-anyway persistence.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p stemchart-cli --test test_resolver
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use pretty_assertions::assert_eq;

use stemchart_cli::resolve::{Outcome, ResolveRequest, Resolver};
use stemchart_cli::response::ChartResponse;
use stemchart_cli::sources::{
    AiChart, AiConfig, AiEngine, AudioSource, MidiLookup, MidiSource, NullAiEngine, QualityLevel,
    SourceResult, TrackMetadata,
};
use stemchart_cli::store::{ChartStore, MemoryChartStore};
use stemchart_gen::{MidiNoteEvent, ParsedMidi};
use stemchart_spec::{
    chart_key, legacy_key, revolutionary_key, ChartError, ChartFile, Difficulty, NoteKind, RawNote,
    Stem,
};

/// Audio stub: fixed metadata, counts lookups.
#[derive(Default)]
struct StubAudio {
    metadata: Option<TrackMetadata>,
    metadata_calls: AtomicUsize,
}

impl StubAudio {
    fn with_metadata(metadata: TrackMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            metadata_calls: AtomicUsize::new(0),
        }
    }
}

impl AudioSource for StubAudio {
    fn locate(&self, _: &str) -> SourceResult<PathBuf> {
        SourceResult::Unavailable
    }

    fn metadata(&self, _: &str) -> SourceResult<TrackMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        match &self.metadata {
            Some(metadata) => SourceResult::Ok(metadata.clone()),
            None => SourceResult::Unavailable,
        }
    }
}

/// MIDI stub serving one fixed transcription.
struct StubMidi {
    midi: ParsedMidi,
    stem_specific: bool,
}

impl MidiSource for StubMidi {
    fn load(&self, _: &str, _: Stem) -> SourceResult<MidiLookup> {
        SourceResult::Ok(MidiLookup {
            midi: self.midi.clone(),
            stem_specific: self.stem_specific,
            path: PathBuf::from("stub.mid"),
        })
    }
}

struct NoMidi;

impl MidiSource for NoMidi {
    fn load(&self, _: &str, _: Stem) -> SourceResult<MidiLookup> {
        SourceResult::Unavailable
    }
}

/// AI stub serving one fixed chart.
struct StubAi {
    chart: ChartFile,
    metrics: Option<serde_json::Value>,
}

impl AiEngine for StubAi {
    fn generate(&self, _: &AiConfig) -> SourceResult<AiChart> {
        SourceResult::Ok(AiChart {
            chart: self.chart.clone(),
            quality_metrics: self.metrics.clone(),
        })
    }
}

/// AI stub that records the config it was handed, then declines.
#[derive(Default)]
struct CapturingAi {
    seen: Mutex<Option<AiConfig>>,
}

impl AiEngine for CapturingAi {
    fn generate(&self, config: &AiConfig) -> SourceResult<AiChart> {
        *self.seen.lock().unwrap() = Some(config.clone());
        SourceResult::Unavailable
    }
}

/// Store whose writes always fail.
struct BrokenStore;

impl ChartStore for BrokenStore {
    fn get(&self, _: &str) -> Result<Option<ChartFile>, ChartError> {
        Ok(None)
    }

    fn put(&self, _: &str, _: &ChartFile) -> Result<(), ChartError> {
        Err(ChartError::Persistence(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "disk full",
        )))
    }

    fn exists(&self, _: &str) -> bool {
        false
    }
}

/// Store whose entries exist but can never be read.
struct UnreadableStore;

impl ChartStore for UnreadableStore {
    fn get(&self, _: &str) -> Result<Option<ChartFile>, ChartError> {
        Err(ChartError::Persistence(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "truncated chart file",
        )))
    }

    fn put(&self, _: &str, _: &ChartFile) -> Result<(), ChartError> {
        Ok(())
    }

    fn exists(&self, _: &str) -> bool {
        true
    }
}

fn served(outcome: Outcome) -> ChartResponse {
    match outcome {
        Outcome::Served(response) => response,
        other => panic!("expected Served, got {:?}", other),
    }
}

#[test]
fn test_miss_without_auto_is_not_found() {
    let store = MemoryChartStore::new();
    let audio = StubAudio::default();
    let resolver = Resolver::new(&store, &audio, &NoMidi, &NullAiEngine);

    let mut request = ResolveRequest::new("t1");
    request.auto_allowed = false;

    match resolver.resolve(&request).unwrap() {
        Outcome::NotFound(body) => {
            assert_eq!(body.error, "Chart not found");
            assert!(body.notes.is_empty());
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(store.is_empty());
}

#[test]
fn test_procedural_fallback_persists_and_second_resolve_hits_cache() {
    let store = MemoryChartStore::new();
    let audio = StubAudio::with_metadata(TrackMetadata {
        duration_ms: Some(30_000),
        bpm: Some(120.0),
        title: Some("One".to_string()),
        artist: None,
    });
    let resolver = Resolver::new(&store, &audio, &NoMidi, &NullAiEngine);

    let mut request = ResolveRequest::new("t1");
    request.difficulty = Difficulty::Easy;

    let first = served(resolver.resolve(&request).unwrap());
    assert!(!first.notes.is_empty());
    assert_eq!(first.song_id, "t1");
    assert_eq!(first.title.as_deref(), Some("One"));
    assert_eq!(first.bpm, 120.0);

    // Persisted under the keyed and legacy entries.
    assert!(store.exists(&chart_key("t1", Stem::Melody, Difficulty::Easy)));
    assert!(store.exists(&legacy_key("t1")));

    // Second resolve serves the stored chart without regenerating.
    let calls_after_first = audio.metadata_calls.load(Ordering::SeqCst);
    let second = served(resolver.resolve(&request).unwrap());
    assert_eq!(second.notes, first.notes);
    assert_eq!(audio.metadata_calls.load(Ordering::SeqCst), calls_after_first);
}

#[test]
fn test_procedural_defaults_when_metadata_missing() {
    let store = MemoryChartStore::new();
    let audio = StubAudio::default();
    let resolver = Resolver::new(&store, &audio, &NoMidi, &NullAiEngine);

    let response = served(resolver.resolve(&ResolveRequest::new("t1")).unwrap());
    assert_eq!(response.bpm, 120.0);
    assert!(response.title.is_none());
    assert!(!response.notes.is_empty());
}

#[test]
fn test_midi_path_drums_on_generic_source() {
    let store = MemoryChartStore::new();
    let audio = StubAudio::default();
    let midi = StubMidi {
        midi: ParsedMidi {
            bpm: None,
            notes: vec![
                MidiNoteEvent {
                    start_sec: 0.0,
                    duration_sec: 0.4,
                    pitch: 36,
                },
                MidiNoteEvent {
                    start_sec: 0.5,
                    duration_sec: 0.0,
                    pitch: 55,
                },
                MidiNoteEvent {
                    start_sec: 1.0,
                    duration_sec: 0.2,
                    pitch: 100,
                },
            ],
        },
        stem_specific: false,
    };
    let resolver = Resolver::new(&store, &audio, &midi, &NullAiEngine);

    let mut request = ResolveRequest::new("t1");
    request.stem = Stem::Drums;
    request.difficulty = Difficulty::Expert;

    let response = served(resolver.resolve(&request).unwrap());
    // The high lead note is reshaped away; the rest become taps.
    assert_eq!(response.notes.len(), 2);
    for note in &response.notes {
        assert_eq!(note.kind, NoteKind::Tap);
        assert!(note.lane <= 1 || note.pitch.is_some_and(|p| p < 60));
    }

    assert!(store.exists(&chart_key("t1", Stem::Drums, Difficulty::Expert)));
}

#[test]
fn test_revolutionary_uses_ai_and_rev_key() {
    let store = MemoryChartStore::new();
    let audio = StubAudio::default();

    let mut ai_chart = ChartFile::new("t1");
    ai_chart.difficulty = Some(Difficulty::Hard);
    ai_chart.notes.push(RawNote::tap(1500, 2));
    let ai = StubAi {
        chart: ai_chart,
        metrics: Some(serde_json::json!({ "confidence": 0.87 })),
    };

    let resolver = Resolver::new(&store, &audio, &NoMidi, &ai);

    let mut request = ResolveRequest::new("t1");
    request.difficulty = Difficulty::Hard;
    request.revolutionary = true;

    let response = served(resolver.resolve(&request).unwrap());
    assert_eq!(response.revolutionary, Some(true));
    assert_eq!(response.ai_powered, Some(true));
    assert_eq!(
        response.quality_metrics,
        Some(serde_json::json!({ "confidence": 0.87 }))
    );

    // Stored only under the revolutionary key.
    assert!(store.exists(&revolutionary_key("t1", Stem::Melody, Difficulty::Hard)));
    assert!(!store.exists(&chart_key("t1", Stem::Melody, Difficulty::Hard)));
}

#[test]
fn test_revolutionary_falls_back_when_ai_unavailable() {
    let store = MemoryChartStore::new();
    let audio = StubAudio::default();
    let resolver = Resolver::new(&store, &audio, &NoMidi, &NullAiEngine);

    let mut request = ResolveRequest::new("t1");
    request.revolutionary = true;

    // The engine is unavailable, so the procedural path answers.
    let response = served(resolver.resolve(&request).unwrap());
    assert!(response.revolutionary.is_none());
    assert!(!response.notes.is_empty());
}

#[test]
fn test_persistence_failure_still_serves() {
    let audio = StubAudio::default();
    let resolver = Resolver::new(&BrokenStore, &audio, &NoMidi, &NullAiEngine);

    let response = served(resolver.resolve(&ResolveRequest::new("t1")).unwrap());
    assert!(!response.notes.is_empty());
}

#[test]
fn test_stored_chart_must_match_structurally() {
    let store = MemoryChartStore::new();

    // Stored chart only carries an easy tier.
    let mut stored = ChartFile::new("t1");
    stored.difficulty = Some(Difficulty::Easy);
    stored.notes.push(RawNote::tap(1500, 0));
    store
        .put(&chart_key("t1", Stem::Melody, Difficulty::Expert), &stored)
        .unwrap();

    let audio = StubAudio::default();
    let resolver = Resolver::new(&store, &audio, &NoMidi, &NullAiEngine);

    // An expert request cannot be satisfied by the easy chart; the
    // procedural path generates a real expert chart instead.
    let mut request = ResolveRequest::new("t1");
    request.difficulty = Difficulty::Expert;
    let response = served(resolver.resolve(&request).unwrap());
    assert!(response.notes.len() > 1);
}

#[test]
fn test_ai_config_carries_request_flags() {
    let audio = StubAudio::default();
    let ai = CapturingAi::default();
    let store = MemoryChartStore::new();
    let resolver = Resolver::new(&store, &audio, &NoMidi, &ai);

    let mut request = ResolveRequest::new("t1");
    request.difficulty = Difficulty::Hard;
    request.revolutionary = true;
    request.ai_requested = true;
    request.quality = QualityLevel::High;
    request.offset_ms = 40;

    // The engine declines, so resolution falls through, but the config
    // it saw must carry the full request.
    let response = served(resolver.resolve(&request).unwrap());
    assert!(response.revolutionary.is_none());

    let seen = ai.seen.lock().unwrap().clone().unwrap();
    assert_eq!(seen.track_id, "t1");
    assert_eq!(seen.difficulty, Difficulty::Hard);
    assert!(seen.ai_requested);
    assert_eq!(seen.quality, QualityLevel::High);
    assert_eq!(seen.offset_ms, 40);
}

#[test]
fn test_empty_ai_chart_is_not_persisted() {
    let store = MemoryChartStore::new();
    let audio = StubAudio::default();
    // A chart with no notes: a failed engine run dressed up as success.
    let ai = StubAi {
        chart: ChartFile::new("t1"),
        metrics: None,
    };
    let resolver = Resolver::new(&store, &audio, &NoMidi, &ai);

    let mut request = ResolveRequest::new("t1");
    request.revolutionary = true;

    let response = served(resolver.resolve(&request).unwrap());
    assert!(response.revolutionary.is_none());
    assert!(!response.notes.is_empty());
    assert!(!store.exists(&revolutionary_key("t1", Stem::Melody, Difficulty::Medium)));
}

#[test]
fn test_unreadable_store_without_auto_is_load_failure() {
    let audio = StubAudio::default();
    let resolver = Resolver::new(&UnreadableStore, &audio, &NoMidi, &NullAiEngine);

    let mut request = ResolveRequest::new("t1");
    request.auto_allowed = false;

    match resolver.resolve(&request).unwrap() {
        Outcome::Failed(body) => {
            assert_eq!(body.error, "Failed to load chart");
            assert!(body.notes.is_empty());
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[test]
fn test_unreadable_store_with_auto_regenerates() {
    let audio = StubAudio::default();
    let resolver = Resolver::new(&UnreadableStore, &audio, &NoMidi, &NullAiEngine);

    // With generation allowed the broken entry is simply rebuilt over.
    let response = served(resolver.resolve(&ResolveRequest::new("t1")).unwrap());
    assert!(!response.notes.is_empty());
}

#[test]
fn test_legacy_key_lookup() {
    let store = MemoryChartStore::new();

    let mut stored = ChartFile::new("t1");
    stored.notes.push(RawNote::tap(1500, 3));
    store.put(&legacy_key("t1"), &stored).unwrap();

    let audio = StubAudio::default();
    let resolver = Resolver::new(&store, &audio, &NoMidi, &NullAiEngine);

    // Flat legacy chart with no declared difficulty matches any request.
    let mut request = ResolveRequest::new("t1");
    request.stem = Stem::Vocals;
    request.difficulty = Difficulty::Hard;
    let response = served(resolver.resolve(&request).unwrap());
    assert_eq!(response.notes, stored.notes);
}
