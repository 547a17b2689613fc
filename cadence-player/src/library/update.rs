//! Track metadata updates
//!
//! Updates are expressed as a [`TrackUpdate`] record with one optional field
//! per editable attribute. Callers that only have a field name and a loosely
//! typed value (CLI, JSON) go through [`TrackUpdate::set_field`], which
//! dispatches through a static table of field setters and rejects names not
//! in the table.

use super::Track;
use cadence_common::{Error, Result};
use serde_json::Value;

/// Editable track metadata; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<u32>,
    pub genre: Option<String>,
    pub moods: Option<Vec<String>>,
    /// `Some(None)` clears the bpm
    pub bpm: Option<Option<u32>>,
}

/// One entry of the field dispatch table
pub struct FieldSetter {
    pub key: &'static str,
    pub apply: fn(&mut TrackUpdate, Value) -> Result<()>,
}

fn string_value(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::InvalidInput(format!(
            "{}: expected a string, got {}",
            key, other
        ))),
    }
}

fn u32_value(key: &str, value: Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            Error::InvalidInput(format!("{}: expected a non-negative integer, got {}", key, value))
        })
}

/// Field dispatch table
///
/// `id`, `play_count` and `last_played` are absent; they are owned by the
/// library and by playback.
static FIELDS: &[FieldSetter] = &[
    FieldSetter {
        key: "title",
        apply: |u, v| {
            u.title = Some(string_value("title", v)?);
            Ok(())
        },
    },
    FieldSetter {
        key: "artist",
        apply: |u, v| {
            u.artist = Some(string_value("artist", v)?);
            Ok(())
        },
    },
    FieldSetter {
        key: "album",
        apply: |u, v| {
            u.album = Some(string_value("album", v)?);
            Ok(())
        },
    },
    FieldSetter {
        key: "duration_seconds",
        apply: |u, v| {
            u.duration_seconds = Some(u32_value("duration_seconds", v)?);
            Ok(())
        },
    },
    FieldSetter {
        key: "genre",
        apply: |u, v| {
            u.genre = Some(string_value("genre", v)?);
            Ok(())
        },
    },
    FieldSetter {
        key: "moods",
        apply: |u, v| {
            let moods = match v {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| string_value("moods", item))
                    .collect::<Result<Vec<_>>>()?,
                other => {
                    return Err(Error::InvalidInput(format!(
                        "moods: expected an array of strings, got {}",
                        other
                    )))
                }
            };
            u.moods = Some(moods);
            Ok(())
        },
    },
    FieldSetter {
        key: "bpm",
        apply: |u, v| {
            u.bpm = Some(match v {
                Value::Null => None,
                other => Some(u32_value("bpm", other)?),
            });
            Ok(())
        },
    },
];

impl TrackUpdate {
    /// Editable fields, in dispatch order
    pub fn fields() -> &'static [FieldSetter] {
        FIELDS
    }

    /// Set a field by name
    ///
    /// Unknown names fail with `InvalidField`; values of the wrong type fail
    /// with `InvalidInput`.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<()> {
        let setter = Self::fields()
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| Error::InvalidField(format!("Track has no editable field {:?}", key)))?;
        (setter.apply)(self, value)
    }

    /// Builder-style [`set_field`](Self::set_field)
    pub fn with_field(mut self, key: &str, value: Value) -> Result<Self> {
        self.set_field(key, value)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == TrackUpdate::default()
    }

    /// Write every present field into `track`
    pub fn apply_to(self, track: &mut Track) {
        if let Some(title) = self.title {
            track.title = title;
        }
        if let Some(artist) = self.artist {
            track.artist = artist;
        }
        if let Some(album) = self.album {
            track.album = album;
        }
        if let Some(duration) = self.duration_seconds {
            track.duration_seconds = duration;
        }
        if let Some(genre) = self.genre {
            track.genre = genre;
        }
        if let Some(moods) = self.moods {
            track.moods = moods;
        }
        if let Some(bpm) = self.bpm {
            track.bpm = bpm;
        }
    }
}
