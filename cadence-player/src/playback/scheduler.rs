//! Playback scheduler
//!
//! Drives simulated playback of a FIFO queue of track ids. Each state change
//! is recorded in a bounded [`PlaybackHistory`] and timestamped by a
//! [`LogicalClock`] that advances by track durations and steps back by the
//! crossfade overlap between consecutive playlist tracks.
//!
//! The scheduler never holds a copy of a track. It keeps the id of the
//! current track and resolves it through the [`TrackLibrary`] whenever the
//! track is needed.
//!
//! Failures are not rolled back: a lookup error part way through
//! [`play_playlist`](PlaybackScheduler::play_playlist) leaves the queue
//! partially drained and the tracks already played marked as played.

use crate::equalizer::{EqualizerBank, EqualizerPreset, FLAT_PRESET};
use crate::library::{Track, TrackLibrary};
use crate::playback::history::PlaybackHistory;
use crate::playlist::Playlist;
use cadence_common::config::{PlaybackSettings, DEFAULT_CROSSFADE_SECONDS, DEFAULT_HISTORY_CAPACITY};
use cadence_common::{EventMetadata, LogicalClock, PlaybackAction, PlaybackEvent, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Scheduler construction options
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    /// Maximum overlap between consecutive playlist tracks
    pub crossfade_seconds: u32,
    /// Number of events kept in history
    pub history_capacity: usize,
    /// Logical clock origin; the wall clock at construction when `None`
    pub clock_origin: Option<DateTime<Utc>>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            crossfade_seconds: DEFAULT_CROSSFADE_SECONDS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            clock_origin: None,
        }
    }
}

impl From<&PlaybackSettings> for SchedulerOptions {
    fn from(settings: &PlaybackSettings) -> Self {
        Self {
            crossfade_seconds: settings.crossfade_seconds,
            history_capacity: settings.history_capacity,
            clock_origin: None,
        }
    }
}

/// Whether a track is currently loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Playing,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Playing => write!(f, "playing"),
        }
    }
}

/// Queue-driven playback simulator
pub struct PlaybackScheduler<L: TrackLibrary> {
    library: L,
    equalizer_bank: EqualizerBank,
    crossfade_seconds: u32,
    queue: VecDeque<String>,
    history: PlaybackHistory,
    clock: LogicalClock,
    current_track_id: Option<String>,
    active_preset: EqualizerPreset,
}

impl<L: TrackLibrary> PlaybackScheduler<L> {
    /// Scheduler with the built-in equalizer bank and default options
    pub fn new(library: L) -> Self {
        let equalizer_bank = EqualizerBank::builtin();
        let active_preset = EqualizerPreset::flat(FLAT_PRESET);
        Self::assemble(library, equalizer_bank, active_preset, SchedulerOptions::default())
    }

    /// Scheduler with an explicit bank and options
    ///
    /// The bank must contain the `flat` preset, which becomes the initial
    /// active preset; otherwise this fails with `NotFound`.
    pub fn with_options(
        library: L,
        equalizer_bank: EqualizerBank,
        options: SchedulerOptions,
    ) -> Result<Self> {
        let active_preset = equalizer_bank.get(FLAT_PRESET)?.clone();
        Ok(Self::assemble(library, equalizer_bank, active_preset, options))
    }

    fn assemble(
        library: L,
        equalizer_bank: EqualizerBank,
        active_preset: EqualizerPreset,
        options: SchedulerOptions,
    ) -> Self {
        let clock = match options.clock_origin {
            Some(origin) => LogicalClock::starting_at(origin),
            None => LogicalClock::default(),
        };
        Self {
            library,
            equalizer_bank,
            crossfade_seconds: options.crossfade_seconds,
            queue: VecDeque::new(),
            history: PlaybackHistory::with_capacity(options.history_capacity),
            clock,
            current_track_id: None,
            active_preset,
        }
    }

    // ========================================================================
    // Queue operations
    // ========================================================================

    /// Append ids to the back of the queue
    ///
    /// Ids are not checked here; unknown ids fail when they are played.
    pub fn enqueue<I, S>(&mut self, track_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.queue.len();
        self.queue.extend(track_ids.into_iter().map(Into::into));
        debug!("Enqueued {} tracks (queue length {})", self.queue.len() - before, self.queue.len());
    }

    /// Play the track at the front of the queue
    ///
    /// On an empty queue logs `queue_empty`, clears the current track and
    /// returns `None`. Otherwise the popped id is resolved (an unknown id is
    /// `NotFound`, after the id has already left the queue), marked played
    /// at the current logical time, made current, and the clock advances by
    /// the track's duration before the `play` event is logged.
    pub fn play_next(&mut self) -> Result<Option<&Track>> {
        let Some(track_id) = self.queue.pop_front() else {
            self.log_event(PlaybackAction::QueueEmpty, None, None);
            self.current_track_id = None;
            return Ok(None);
        };

        let played_at = self.clock.now();
        let track = self.library.get_track_mut(&track_id)?;
        track.mark_played(played_at);
        let duration = track.duration_seconds;

        self.current_track_id = Some(track_id.clone());
        self.clock.advance(i64::from(duration));
        self.log_event(PlaybackAction::Play, Some(track_id.clone()), None);

        self.library.get_track(&track_id).map(Some)
    }

    /// Enqueue a playlist and play until the queue is empty
    ///
    /// Consecutive tracks overlap by the crossfade. The first failed lookup
    /// aborts the run and is returned; nothing already done is undone.
    pub fn play_playlist(&mut self, playlist: &Playlist) -> Result<()> {
        info!("Playing playlist {:?} ({} tracks)", playlist.name, playlist.len());
        self.enqueue(playlist.track_ids().iter().cloned());

        while !self.queue.is_empty() {
            if let Err(e) = self.play_next().map(|_| ()) {
                warn!(
                    "Playlist {:?} aborted with {} tracks left in queue: {}",
                    playlist.name,
                    self.queue.len(),
                    e
                );
                return Err(e);
            }
            self.apply_crossfade()?;
        }
        Ok(())
    }

    /// Log a `skip` for the current track (if any), then play the next one
    pub fn skip(&mut self) -> Result<Option<&Track>> {
        if let Some(current) = self.current_track_id.clone() {
            self.log_event(PlaybackAction::Skip, Some(current), None);
        }
        self.play_next()
    }

    /// Undo the most recent history entry
    ///
    /// The entry is removed from history. If it referred to a track, that
    /// track goes back to the front of the queue and a `rewind` event is
    /// logged; an entry without a track is simply discarded. No-op on an
    /// empty history.
    pub fn rewind(&mut self) {
        let Some(last_event) = self.history.pop_back() else {
            return;
        };

        match last_event.track_id() {
            Some(track_id) => {
                let track_id = track_id.to_string();
                self.queue.push_front(track_id.clone());
                self.log_event(PlaybackAction::Rewind, Some(track_id), None);
            }
            None => {
                debug!("Rewind discarded {} event without a track", last_event.action());
            }
        }
    }

    // ========================================================================
    // Equalizer
    // ========================================================================

    /// Make the named preset active and log `eq_change`
    pub fn set_equalizer_preset(&mut self, name: &str) -> Result<&EqualizerPreset> {
        let preset = self.equalizer_bank.get(name)?.clone();
        let metadata = preset_metadata(preset.name());
        self.active_preset = preset;
        self.log_event(PlaybackAction::EqChange, None, Some(metadata));
        Ok(&self.active_preset)
    }

    /// Step from the active preset to `target`
    ///
    /// Each intermediate preset becomes active in turn and is logged as an
    /// `eq_transition`. Both the active preset and `target` are looked up by
    /// name in the bank; intermediate presets are named `blend(<a>,<b>)` and
    /// are not registered, so a transition that ends on a blend leaves an
    /// active name the bank cannot resolve.
    pub fn transition_equalizer(&mut self, target: &str, steps: usize) -> Result<()> {
        let transition =
            self.equalizer_bank
                .transition(self.active_preset.name(), target, steps)?;

        for intermediate in transition {
            let metadata = preset_metadata(intermediate.name());
            self.active_preset = intermediate;
            self.log_event(PlaybackAction::EqTransition, None, Some(metadata));
        }
        Ok(())
    }

    // ========================================================================
    // State access
    // ========================================================================

    /// Events, oldest first
    pub fn history(&self) -> &PlaybackHistory {
        &self.history
    }

    /// Queued ids, front first
    pub fn queue(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track_id.as_deref()
    }

    /// Current track, re-resolved through the library
    pub fn current_track(&self) -> Result<Option<&Track>> {
        match &self.current_track_id {
            Some(id) => self.library.get_track(id).map(Some),
            None => Ok(None),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.current_track_id.is_some() {
            SchedulerState::Playing
        } else {
            SchedulerState::Idle
        }
    }

    /// Name of the active equalizer preset
    pub fn active_preset(&self) -> &str {
        self.active_preset.name()
    }

    /// Gains of the active equalizer preset
    pub fn active_equalizer(&self) -> &EqualizerPreset {
        &self.active_preset
    }

    pub fn equalizer_bank(&self) -> &EqualizerBank {
        &self.equalizer_bank
    }

    pub fn clock(&self) -> &LogicalClock {
        &self.clock
    }

    pub fn crossfade_seconds(&self) -> u32 {
        self.crossfade_seconds
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut L {
        &mut self.library
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Overlap the end of the current track with the start of the next one
    ///
    /// Only applies when a track is current and more ids are queued. Moves
    /// the clock back by `min(crossfade, current duration)` and logs it.
    fn apply_crossfade(&mut self) -> Result<()> {
        let Some(current_id) = self.current_track_id.as_deref() else {
            return Ok(());
        };
        if self.queue.is_empty() {
            return Ok(());
        }

        let duration = self.library.get_track(current_id)?.duration_seconds;
        let overlap = self.crossfade_seconds.min(duration);
        self.clock.advance(-i64::from(overlap));

        let mut metadata = EventMetadata::new();
        metadata.insert("seconds".to_string(), json!(overlap));
        self.log_event(PlaybackAction::Crossfade, None, Some(metadata));
        Ok(())
    }

    fn log_event(
        &mut self,
        action: PlaybackAction,
        track_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) {
        let event = PlaybackEvent::new(self.clock.now(), action, track_id, metadata);
        debug!("{}", event);
        self.history.push(event);
    }
}

fn preset_metadata(name: &str) -> EventMetadata {
    let mut metadata = EventMetadata::new();
    metadata.insert("preset".to_string(), json!(name));
    metadata
}
