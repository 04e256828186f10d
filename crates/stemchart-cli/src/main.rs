//! Stemchart CLI - Chart resolution and synthesis from the command line
//!
//! This binary resolves playable rhythm-game charts for tracks (stored,
//! MIDI-derived, or procedurally synthesized), runs the synthesizer
//! directly for authoring, and manages the local chart store.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use stemchart_cli::commands;
use stemchart_cli::commands::resolve::ResolveDirs;

/// Stemchart - Deterministic rhythm-game chart pipeline
#[derive(Parser)]
#[command(name = "stemchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a chart for a track (cache, then AI/MIDI/procedural)
    Resolve {
        /// Track identifier
        track_id: String,

        /// Difficulty tier (easy, medium/normal, hard, expert)
        #[arg(short, long, default_value = "medium")]
        difficulty: String,

        /// Instrument stem (drums, melody, vocals, bass)
        #[arg(short, long, default_value = "melody")]
        stem: String,

        /// Do not generate on a cache miss; report not-found instead
        #[arg(long)]
        no_auto: bool,

        /// Audio sync offset applied to generated notes, in milliseconds
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset_ms: i64,

        /// Bypass the stored chart and regenerate via the AI engine
        #[arg(long)]
        revolutionary: bool,

        /// Request full AI analysis in the engine config
        #[arg(long)]
        ai: bool,

        /// AI generation quality (balanced, high)
        #[arg(long, default_value = "balanced")]
        quality: String,

        /// Chart store directory (default: platform data dir)
        #[arg(long)]
        charts_dir: Option<String>,

        /// Directory containing MIDI transcriptions
        #[arg(long)]
        midi_dir: Option<String>,

        /// Directory containing audio files and metadata sidecars
        #[arg(long)]
        audio_dir: Option<String>,

        /// Derive MIDI drop-rate thinning from the chart seed
        /// (reproducible regeneration)
        #[arg(long)]
        seeded_thinning: bool,
    },

    /// Synthesize a procedural chart from tempo and duration
    Synth {
        /// Track identifier
        track_id: String,

        /// Track tempo in beats per minute
        #[arg(long)]
        bpm: f64,

        /// Track length in milliseconds
        #[arg(long)]
        duration_ms: i64,

        /// Difficulty tier (easy, medium/normal, hard, expert)
        #[arg(short, long, default_value = "medium")]
        difficulty: String,

        /// Write the notes as a nested per-stem block for this stem
        /// instead of the flat shape
        #[arg(short, long)]
        stem: Option<String>,

        /// Audio sync offset in milliseconds
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset_ms: i64,

        /// Song title for chart metadata
        #[arg(long)]
        title: Option<String>,

        /// Artist for chart metadata
        #[arg(long)]
        artist: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Manage the local chart store
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
}

#[derive(Subcommand)]
enum StoreCommands {
    /// Show store information (chart count, total size)
    Info {
        /// Chart store directory (default: platform data dir)
        #[arg(long)]
        charts_dir: Option<String>,
    },
    /// Remove all stored charts
    Clear {
        /// Chart store directory (default: platform data dir)
        #[arg(long)]
        charts_dir: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            track_id,
            difficulty,
            stem,
            no_auto,
            offset_ms,
            revolutionary,
            ai,
            quality,
            charts_dir,
            midi_dir,
            audio_dir,
            seeded_thinning,
        } => commands::resolve::run(
            &track_id,
            &difficulty,
            &stem,
            no_auto,
            offset_ms,
            revolutionary,
            ai,
            &quality,
            ResolveDirs {
                charts_dir,
                midi_dir,
                audio_dir,
            },
            seeded_thinning,
        ),
        Commands::Synth {
            track_id,
            bpm,
            duration_ms,
            difficulty,
            stem,
            offset_ms,
            title,
            artist,
            output,
        } => commands::synth::run(
            &track_id,
            bpm,
            duration_ms,
            &difficulty,
            stem.as_deref(),
            offset_ms,
            title.as_deref(),
            artist.as_deref(),
            output.as_deref(),
        ),
        Commands::Store { command } => match command {
            StoreCommands::Info { charts_dir } => commands::store::info(charts_dir),
            StoreCommands::Clear { charts_dir } => commands::store::clear(charts_dir),
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
