//! notescore - score transcription output against note annotations
//!
//! Subcommands:
//! - `notescore evaluate` - Print COnPOff/COnP/COn precision, recall and F1
//! - `notescore show-config` - Print the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notescore::{evaluate_corpus_with, report, NoteCollection, ScoreParams};
use scoreconf::ScoreConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notescore")]
#[command(about = "Note-level evaluation of music transcription")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./notescore.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score predictions against annotations
    Evaluate {
        /// Ground-truth JSON (song ID -> notes)
        #[arg(long)]
        annotation_path: Option<PathBuf>,

        /// Prediction JSON (song ID -> notes)
        #[arg(long)]
        predicted_json_path: Option<PathBuf>,

        /// Onset tolerance in seconds
        #[arg(long)]
        tolerance: Option<f64>,

        /// Pitch tolerance in cents
        #[arg(long)]
        pitch_tolerance: Option<f64>,

        /// Clock offset in seconds (positive delays predictions, negative delays annotations)
        #[arg(long, allow_hyphen_values = true)]
        time_shift: Option<f64>,

        /// Semitones added to annotation pitches
        #[arg(long, allow_hyphen_values = true)]
        pitch_shift: Option<f64>,

        /// Also print one line per song
        #[arg(long)]
        per_song: bool,
    },

    /// Print the effective configuration and where it came from
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = ScoreConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.telemetry.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    for (var, value) in &sources.ignored_env {
        warn!(value = %value, "ignoring {}: not a number", var);
    }

    match cli.command {
        Commands::Evaluate {
            annotation_path,
            predicted_json_path,
            tolerance,
            pitch_tolerance,
            time_shift,
            pitch_shift,
            per_song,
        } => {
            if let Some(path) = annotation_path {
                config.paths.annotations = path;
            }
            if let Some(path) = predicted_json_path {
                config.paths.predictions = path;
            }
            if let Some(v) = tolerance {
                config.tolerance.onset = v;
            }
            if let Some(v) = pitch_tolerance {
                config.tolerance.pitch_cents = v;
            }
            if let Some(v) = time_shift {
                config.shift.time = v;
            }
            if let Some(v) = pitch_shift {
                config.shift.pitch_semitones = v;
            }

            evaluate(&config, per_song)?;
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml());
            println!();
            for file in &sources.files {
                println!("# loaded: {}", file.display());
            }
            for var in &sources.env_overrides {
                println!("# env: {}", var);
            }
            for (var, value) in &sources.ignored_env {
                println!("# ignored env: {}={}", var, value);
            }
        }
    }

    Ok(())
}

fn evaluate(config: &ScoreConfig, per_song: bool) -> Result<()> {
    let params = ScoreParams::from(config);
    info!(
        annotations = %config.paths.annotations.display(),
        predictions = %config.paths.predictions.display(),
        onset_tolerance = params.onset_tolerance,
        "evaluating"
    );

    let reference = NoteCollection::load(&config.paths.annotations)
        .with_context(|| format!("loading annotations from {}", config.paths.annotations.display()))?;
    let estimate = NoteCollection::load(&config.paths.predictions)
        .with_context(|| format!("loading predictions from {}", config.paths.predictions.display()))?;

    let evaluation = evaluate_corpus_with(&reference, &estimate, &params)
        .context("scoring predictions")?;

    if per_song {
        for (id, record) in evaluation.song_ids.iter().zip(&evaluation.records) {
            println!("{}", report::render_song(id, record));
        }
    }
    print!("{}", report::render(&evaluation.result));

    Ok(())
}
