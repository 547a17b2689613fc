//! Playback scheduling and history

pub mod history;
pub mod scheduler;

pub use history::{PlaybackHistory, RingLog};
pub use scheduler::{PlaybackScheduler, SchedulerOptions, SchedulerState};
