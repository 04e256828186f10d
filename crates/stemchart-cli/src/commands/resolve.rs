//! Resolve command: run the full strategy ladder for one request.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use stemchart_gen::Thinning;
use stemchart_spec::{chart_seed, Difficulty, Stem};

use crate::resolve::{Outcome, ResolveRequest, Resolver};
use crate::sources::{default_content_dir, FsAudioSource, FsMidiSource, NullAiEngine, QualityLevel};
use crate::store::FsChartStore;

/// Directory arguments shared by the filesystem collaborators.
pub struct ResolveDirs {
    pub charts_dir: Option<String>,
    pub midi_dir: Option<String>,
    pub audio_dir: Option<String>,
}

fn resolve_dir(explicit: Option<String>, kind: &str) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => default_content_dir(kind)
            .with_context(|| format!("no platform data directory; pass --{}-dir", kind)),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    track_id: &str,
    difficulty: &str,
    stem: &str,
    no_auto: bool,
    offset_ms: i64,
    revolutionary: bool,
    ai: bool,
    quality: &str,
    dirs: ResolveDirs,
    seeded_thinning: bool,
) -> Result<ExitCode> {
    let difficulty: Difficulty = difficulty
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --difficulty")?;
    let stem: Stem = stem
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("invalid --stem")?;
    let quality: QualityLevel = quality.parse().unwrap_or_default();

    let charts_dir = match dirs.charts_dir {
        Some(dir) => PathBuf::from(dir),
        None => FsChartStore::default_charts_dir()
            .context("no platform data directory; pass --charts-dir")?,
    };
    let store = FsChartStore::new(charts_dir);
    let audio = FsAudioSource::new(resolve_dir(dirs.audio_dir, "audio")?);
    let midi = FsMidiSource::new(resolve_dir(dirs.midi_dir, "midi")?);
    let ai_engine = NullAiEngine;

    let thinning = if seeded_thinning {
        Thinning::Seeded(chart_seed(track_id, difficulty))
    } else {
        Thinning::Unseeded
    };

    let resolver = Resolver::new(&store, &audio, &midi, &ai_engine).with_thinning(thinning);

    let request = ResolveRequest {
        track_id: track_id.to_string(),
        stem,
        difficulty,
        auto_allowed: !no_auto,
        offset_ms,
        revolutionary,
        ai_requested: ai,
        quality,
    };

    let outcome = resolver.resolve(&request)?;
    println!("{}", outcome.to_json_pretty()?);

    match outcome {
        Outcome::Served(_) => Ok(ExitCode::SUCCESS),
        Outcome::NotFound(_) => {
            eprintln!("{} chart not found", "MISS".yellow().bold());
            Ok(ExitCode::from(1))
        }
        Outcome::Failed(_) => {
            eprintln!("{} chart resolution failed", "FAILED".red().bold());
            Ok(ExitCode::from(2))
        }
    }
}
