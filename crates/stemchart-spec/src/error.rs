//! Error taxonomy for chart resolution.

use thiserror::Error;

/// The strategy-level failures the resolution pipeline distinguishes.
///
/// `Generation` never surfaces to the client; it causes fallthrough to
/// the next, cheaper strategy. `Persistence` never aborts a response — a
/// generated chart is served even when it could not be cached.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Missing or malformed request input; terminal, no retry.
    #[error("invalid request: {0}")]
    Input(String),

    /// Unexpected failure inside a synthesis strategy.
    #[error("chart generation failed: {0}")]
    Generation(String),

    /// Store write failure.
    #[error("chart persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    /// Stored chart could not be decoded.
    #[error("chart decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
