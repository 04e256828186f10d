//! Store key construction.
//!
//! Keys are pure functions of the request identity so the orchestrator and
//! the store never inline string concatenation.

use crate::difficulty::Difficulty;
use crate::stem::Stem;

/// Strips every character outside `[A-Za-z0-9_-]`.
///
/// Sanitized ids from different raw ids can theoretically collide (e.g.
/// `"a:b"` and `"a.b"` both sanitize to `"ab"`); that is accepted for this
/// domain, which is why the behavior lives behind one named function.
pub fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Store key for one `(trackId, stem, difficulty)` combination.
pub fn chart_key(track_id: &str, stem: Stem, difficulty: Difficulty) -> String {
    format!(
        "{}_{}_{}",
        sanitize_id(track_id),
        stem.as_str(),
        difficulty.as_str()
    )
}

/// Legacy per-track key kept for backward compatibility.
pub fn legacy_key(track_id: &str) -> String {
    sanitize_id(track_id)
}

/// Key suffix distinguishing charts regenerated by the revolutionary
/// engine from the standard cache entry.
pub const REVOLUTIONARY_SUFFIX: &str = "_rev";

/// Store key for a revolutionary-mode chart.
pub fn revolutionary_key(track_id: &str, stem: Stem, difficulty: Difficulty) -> String {
    format!(
        "{}{}",
        chart_key(track_id, stem, difficulty),
        REVOLUTIONARY_SUFFIX
    )
}
