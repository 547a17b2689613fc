//! Cadence command-line entry point
//!
//! Thin front end over the library, the playback scheduler and the
//! recommendation engine. Configuration is resolved once here and passed down
//! explicitly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cadence_common::config::{resolve_library_path, TomlConfig, LIBRARY_PATH_ENV};
use cadence_player::{
    EqualizerBank, MusicLibrary, PlaybackScheduler, Playlist, RecommendationEngine,
    SchedulerOptions,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cadence
#[derive(Parser, Debug)]
#[command(name = "cadence")]
#[command(about = "Deterministic music playback simulator")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Library storage file
    #[arg(short, long, global = true, env = LIBRARY_PATH_ENV)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import tracks from a JSON file
    Import {
        /// JSON array of track objects
        path: PathBuf,
    },

    /// List tracks in the library
    List {
        /// Search query to filter tracks
        #[arg(long)]
        filter: Option<String>,
    },

    /// Simulate playing a playlist and print the event history
    Play {
        /// JSON array of track ids
        playlist: PathBuf,

        /// Override the configured crossfade overlap
        #[arg(long)]
        crossfade: Option<u32>,

        /// Equalizer preset to activate before playing
        #[arg(long)]
        eq: Option<String>,

        /// Preset to transition to after the playlist finishes
        #[arg(long)]
        transition: Option<String>,

        /// Number of transition steps
        #[arg(long, default_value = "5")]
        steps: usize,
    },

    /// Generate recommendations
    Recommend {
        mode: RecommendMode,

        /// Mood to match (mood mode only)
        value: Option<String>,

        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// List available equalizer presets
    Presets,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RecommendMode {
    Mood,
    Trending,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let library_path = resolve_library_path(args.library.as_deref(), LIBRARY_PATH_ENV, &config);
    info!("Library: {}", library_path.display());

    let mut library = MusicLibrary::open(&library_path)
        .with_context(|| format!("Failed to open library {}", library_path.display()))?;

    match args.command {
        Command::Import { path } => {
            let imported = library
                .import_json_file(&path, true)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            println!("Imported {} tracks into the library", imported);
        }

        Command::List { filter } => {
            let tracks = match filter.as_deref() {
                Some(query) => library.search(query),
                None => library.list_tracks(),
            };
            for track in tracks {
                println!("{}", track);
            }
        }

        Command::Play {
            playlist,
            crossfade,
            eq,
            transition,
            steps,
        } => {
            let playlist = Playlist::from_json_file(&playlist)
                .with_context(|| format!("Failed to read playlist {}", playlist.display()))?;
            let bank = EqualizerBank::from_definitions(&config.equalizer.presets)
                .context("Invalid equalizer preset in configuration")?;

            let mut options = SchedulerOptions::from(&config.playback);
            if let Some(seconds) = crossfade {
                options.crossfade_seconds = seconds;
            }

            let mut scheduler = PlaybackScheduler::with_options(&mut library, bank, options)?;
            if let Some(preset) = eq.as_deref() {
                scheduler.set_equalizer_preset(preset)?;
            }

            let outcome = scheduler.play_playlist(&playlist);
            if outcome.is_ok() {
                if let Some(target) = transition.as_deref() {
                    scheduler.transition_equalizer(target, steps)?;
                }
            }

            for event in scheduler.history() {
                println!("{}", event);
            }
            outcome.with_context(|| format!("Playlist {:?} stopped early", playlist.name))?;

            library.save().context("Failed to save play statistics")?;
        }

        Command::Recommend { mode, value, limit } => {
            let engine = RecommendationEngine::new(&library);
            let results = match mode {
                RecommendMode::Mood => {
                    let mood = value.context("mood mode requires a value")?;
                    engine.recommend_by_mood(&mood, limit)
                }
                RecommendMode::Trending => engine.top_trending(limit),
            };
            for track in results {
                println!(
                    "{}: {} - {} [{} plays]",
                    track.id, track.title, track.artist, track.play_count
                );
            }
        }

        Command::Presets => {
            let bank = EqualizerBank::from_definitions(&config.equalizer.presets)
                .context("Invalid equalizer preset in configuration")?;
            for name in bank.names() {
                let preset = bank.get(name)?;
                let gains: Vec<String> = preset
                    .gains()
                    .map(|(band, gain)| format!("{}={:+.1}", band, gain))
                    .collect();
                println!("{}: {}", name, gains.join(" "));
            }
        }
    }

    Ok(())
}
