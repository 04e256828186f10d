//! Stemchart Generation Backend - Deterministic Chart Synthesis
//!
//! This crate turns a track identity plus either a MIDI transcription or
//! bare tempo/duration metadata into a playable, difficulty-shaped note
//! chart. It is the deterministic core of the chart pipeline: given the
//! same inputs, the procedural path produces byte-identical note
//! sequences across requests.
//!
//! # Determinism
//!
//! - The procedural synthesizer draws every roll from a Park-Miller LCG
//!   seeded from `"<trackId>-<difficulty>"` (see [`rng`]).
//! - Pattern selection per bar is a pure function of seed and bar index.
//! - The one deliberate exception is the MIDI path's drop-rate thinning,
//!   which historically used process randomness; [`shape::Thinning`]
//!   keeps that behavior selectable instead of silently changing it.
//!
//! # Module Structure
//!
//! - [`rng`]: the seeded LCG
//! - [`pattern`]: the fixed rhythmic template library
//! - [`tuning`]: per-difficulty probability and spacing tables
//! - [`procedural`]: full-chart synthesis from BPM/duration
//! - [`extract`]: MIDI note list to game notes
//! - [`quantize`]: beat-grid snapping
//! - [`shape`]: min-gap enforcement and thinning

pub mod extract;
pub mod pattern;
pub mod procedural;
pub mod quantize;
pub mod rng;
pub mod shape;
pub mod tuning;

pub use extract::{extract_notes, lane_for_pitch, MidiNoteEvent, ParsedMidi};
pub use procedural::{build_procedural_chart, ProceduralParams, MIN_NOTES};
pub use quantize::{quantize, DEFAULT_DIVISION};
pub use rng::ChartRng;
pub use shape::{apply_drop_rate, enforce_min_gap, shape_for_difficulty, Thinning};
