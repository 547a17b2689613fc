//! # Cadence Common Library
//!
//! Shared code for the Cadence playback simulator including:
//! - Error taxonomy shared by the library, scheduler and CLI
//! - Configuration loading (TOML file, environment, platform defaults)
//! - Playback event records
//! - Logical clock used to timestamp simulated playback

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use events::{EventMetadata, PlaybackAction, PlaybackEvent};
pub use time::LogicalClock;
