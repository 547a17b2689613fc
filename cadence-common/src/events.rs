//! Playback event records
//!
//! Every state change made by the playback scheduler is captured as one
//! immutable [`PlaybackEvent`]. Events carry the logical timestamp at which
//! they happened, the kind of change, and optionally the track involved and a
//! small metadata map (active preset name, crossfade overlap, ...).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form event metadata, keyed by field name
pub type EventMetadata = BTreeMap<String, serde_json::Value>;

/// Kind of scheduler state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackAction {
    Play,
    Skip,
    Rewind,
    QueueEmpty,
    EqChange,
    EqTransition,
    Crossfade,
}

impl PlaybackAction {
    /// Wire name of the action (`play`, `queue_empty`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackAction::Play => "play",
            PlaybackAction::Skip => "skip",
            PlaybackAction::Rewind => "rewind",
            PlaybackAction::QueueEmpty => "queue_empty",
            PlaybackAction::EqChange => "eq_change",
            PlaybackAction::EqTransition => "eq_transition",
            PlaybackAction::Crossfade => "crossfade",
        }
    }
}

impl std::fmt::Display for PlaybackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded scheduler state change
///
/// Fields are only readable; an event cannot be altered after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    timestamp: DateTime<Utc>,
    action: PlaybackAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    track_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<EventMetadata>,
}

impl PlaybackEvent {
    /// Create an event
    pub fn new(
        timestamp: DateTime<Utc>,
        action: PlaybackAction,
        track_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) -> Self {
        Self {
            timestamp,
            action,
            track_id,
            metadata,
        }
    }

    /// Logical instant the event was recorded at
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn action(&self) -> PlaybackAction {
        self.action
    }

    /// Track the event refers to, if any
    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    pub fn metadata(&self) -> Option<&EventMetadata> {
        self.metadata.as_ref()
    }

    /// Look up a single metadata value
    pub fn metadata_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

impl std::fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let metadata = match &self.metadata {
            Some(m) => serde_json::to_string(m).map_err(|_| std::fmt::Error)?,
            None => String::new(),
        };
        write!(
            f,
            "{} :: {} :: {} :: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.action,
            self.track_id.as_deref().unwrap_or(""),
            metadata
        )
    }
}
