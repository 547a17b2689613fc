//! # Cadence Player Library
//!
//! Deterministic playback simulator: a queue-driven scheduler stamped by a
//! logical clock, a bounded event history, and an equalizer engine with
//! gradual preset transitions. No audio is decoded or produced.
//!
//! The track library, playlists and recommendations are the collaborators
//! the scheduler plays against; the `cadence` binary is a thin CLI over all
//! of them.

pub mod equalizer;
pub mod library;
pub mod playback;
pub mod playlist;
pub mod recommendation;

pub use cadence_common::{Error, Result};
pub use equalizer::{EqualizerBank, EqualizerPreset, FrequencyBand};
pub use library::{MusicLibrary, Track, TrackLibrary, TrackUpdate};
pub use playback::{PlaybackScheduler, SchedulerOptions, SchedulerState};
pub use playlist::{Playlist, PlaylistCollection};
pub use recommendation::RecommendationEngine;
