//! Stemchart Canonical Chart Library
//!
//! Types, keys, and seed derivation for stemchart chart documents. A chart
//! is the complete ordered note sequence for one track/stem/difficulty
//! combination; this crate owns the wire shapes and the determinism
//! contract, and performs no I/O.
//!
//! # Modules
//!
//! - [`note`]: playable note events and their invariants
//! - [`chart`]: canonical chart document and stored-shape normalization
//! - [`difficulty`] / [`stem`]: request enums
//! - [`key`]: store key construction and id sanitization
//! - [`seed`]: deterministic chart seed derivation
//! - [`error`]: the resolution error taxonomy

pub mod chart;
pub mod difficulty;
pub mod error;
pub mod key;
pub mod note;
pub mod seed;
pub mod stem;

pub use chart::{ChartFile, DifficultyChart, StemBlock, StoredChart, DEFAULT_BPM};
pub use difficulty::Difficulty;
pub use error::ChartError;
pub use key::{chart_key, legacy_key, revolutionary_key, sanitize_id, REVOLUTIONARY_SUFFIX};
pub use note::{is_sorted_by_time, NoteKind, RawNote, LANE_COUNT, NOTE_TRAVEL_MS};
pub use seed::{chart_seed, rolling_hash};
pub use stem::Stem;
