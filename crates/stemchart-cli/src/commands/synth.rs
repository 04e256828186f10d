//! Synth command: run the procedural synthesizer directly.
//!
//! Authoring/debug aid: no store, no collaborators, just the seeded
//! pipeline from tempo and duration to a chart JSON. With `--stem` the
//! notes are written as a nested per-stem block instead of the flat
//! single-difficulty shape.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use stemchart_gen::{build_procedural_chart, ProceduralParams};
use stemchart_spec::{Difficulty, Stem};

#[allow(clippy::too_many_arguments)]
pub fn run(
    track_id: &str,
    bpm: f64,
    duration_ms: i64,
    difficulty: &str,
    stem: Option<&str>,
    offset_ms: i64,
    title: Option<&str>,
    artist: Option<&str>,
    output: Option<&str>,
) -> Result<ExitCode> {
    let difficulty: Difficulty = difficulty
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --difficulty")?;
    let stem: Option<Stem> = stem
        .map(|s| s.parse().map_err(|e: String| anyhow::anyhow!(e)))
        .transpose()
        .context("invalid --stem")?;

    let params = ProceduralParams {
        track_id: track_id.to_string(),
        title: title.map(str::to_string),
        artist: artist.map(str::to_string),
        bpm,
        duration_ms,
        difficulty,
        offset_ms,
    };
    let mut chart = build_procedural_chart(&params);
    let note_count = chart.notes.len();

    if let Some(stem) = stem {
        let notes = std::mem::take(&mut chart.notes);
        chart.difficulty = None;
        chart.insert_stem_notes(stem, difficulty, notes);
    }

    let json = chart.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("failed to write {}", path))?;
            println!(
                "{} {} notes at {} ({:.1} bpm) -> {}",
                "OK".green().bold(),
                note_count,
                difficulty,
                chart.bpm,
                path
            );
        }
        None => println!("{}", json),
    }

    Ok(ExitCode::SUCCESS)
}
