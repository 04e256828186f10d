//! Beat-grid quantization.

/// Default grid subdivision: 16th notes (quarter beat).
pub const DEFAULT_DIVISION: u32 = 4;

/// Snaps `ms` to the nearest `1/division`-beat grid line for `bpm`.
///
/// A missing or non-positive tempo disables quantization and returns the
/// timestamp unmodified.
pub fn quantize(ms: i64, bpm: Option<f64>, division: u32) -> i64 {
    let bpm = match bpm {
        Some(b) if b > 0.0 => b,
        _ => return ms,
    };
    let grid = (60_000.0 / bpm) / division as f64;
    ((ms as f64 / grid).round() * grid).round() as i64
}
