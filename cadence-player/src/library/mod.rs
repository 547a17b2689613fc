//! Track library
//!
//! The library is the single owner of [`Track`] state. Playback code refers to
//! tracks by id and resolves them through the [`TrackLibrary`] trait every time
//! it needs them, so play statistics are only ever updated in one place.
//!
//! [`MusicLibrary`] keeps tracks in memory and, when opened on a storage path,
//! mirrors them to a pretty-printed JSON file (`{ id: track, ... }`).

mod update;

pub use update::{FieldSetter, TrackUpdate};

use cadence_common::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn unknown() -> String {
    "Unknown".to_string()
}

/// A single track in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default = "unknown")]
    pub artist: String,
    #[serde(default = "unknown")]
    pub album: String,
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default = "unknown")]
    pub genre: String,
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    #[serde(default)]
    pub play_count: u64,
}

impl Track {
    /// Create a track with no play statistics
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_seconds: u32,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: unknown(),
            duration_seconds,
            genre: genre.into(),
            moods: Vec::new(),
            bpm: None,
            last_played: None,
            play_count: 0,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    pub fn with_moods<I, S>(mut self, moods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moods = moods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bpm(mut self, bpm: u32) -> Self {
        self.bpm = Some(bpm);
        self
    }

    /// Record one play at `at`
    pub fn mark_played(&mut self, at: DateTime<Utc>) {
        self.play_count += 1;
        self.last_played = Some(at);
    }

    fn matches(&self, query_lower: &str) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.artist.to_lowercase().contains(query_lower)
            || self.album.to_lowercase().contains(query_lower)
            || self.genre.to_lowercase().contains(query_lower)
            || self
                .moods
                .iter()
                .any(|mood| mood.to_lowercase().contains(query_lower))
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} - {} ({})", self.id, self.title, self.artist, self.genre)
    }
}

/// Track lookup as seen by playback
pub trait TrackLibrary {
    /// Resolve a track id; unknown ids are `NotFound`
    fn get_track(&self, id: &str) -> Result<&Track>;

    /// Resolve a track id for in-place mutation
    fn get_track_mut(&mut self, id: &str) -> Result<&mut Track>;
}

impl<L: TrackLibrary + ?Sized> TrackLibrary for &mut L {
    fn get_track(&self, id: &str) -> Result<&Track> {
        (**self).get_track(id)
    }

    fn get_track_mut(&mut self, id: &str) -> Result<&mut Track> {
        (**self).get_track_mut(id)
    }
}

fn track_not_found(id: &str) -> Error {
    Error::NotFound(format!("Track with id {:?} not found", id))
}

/// Track store with optional JSON persistence
#[derive(Debug, Default)]
pub struct MusicLibrary {
    storage_path: Option<PathBuf>,
    tracks: BTreeMap<String, Track>,
}

impl MusicLibrary {
    /// Library that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the library stored at `path`
    ///
    /// Creates the parent directory if needed. A missing file yields an
    /// empty library; the file is written on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let tracks = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str::<BTreeMap<String, Track>>(&content)?
        } else {
            BTreeMap::new()
        };

        info!("Opened library {} ({} tracks)", path.display(), tracks.len());
        Ok(Self {
            storage_path: Some(path),
            tracks,
        })
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    /// Write the library to its storage file (no-op when in memory)
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.storage_path else {
            return Ok(());
        };
        ensure_parent_dir(path)?;
        let payload = serde_json::to_string_pretty(&self.tracks)?;
        std::fs::write(path, payload)?;
        debug!("Saved {} tracks to {}", self.tracks.len(), path.display());
        Ok(())
    }

    /// Insert a track
    ///
    /// Fails with `AlreadyExists` if the id is taken and `overwrite` is false.
    pub fn add_track(&mut self, track: Track, overwrite: bool) -> Result<()> {
        self.insert(track, overwrite)?;
        self.save()
    }

    fn insert(&mut self, track: Track, overwrite: bool) -> Result<()> {
        if !overwrite && self.tracks.contains_key(&track.id) {
            return Err(Error::AlreadyExists(format!(
                "Track with id {:?} already exists",
                track.id
            )));
        }
        debug!("Adding track {}", track.id);
        self.tracks.insert(track.id.clone(), track);
        Ok(())
    }

    /// Insert many tracks and save once
    ///
    /// Stops at the first conflict; tracks inserted before it are kept and
    /// saved.
    pub fn import_tracks<I>(&mut self, tracks: I, overwrite: bool) -> Result<usize>
    where
        I: IntoIterator<Item = Track>,
    {
        let mut imported = 0;
        let mut outcome = Ok(());
        for track in tracks {
            if let Err(e) = self.insert(track, overwrite) {
                outcome = Err(e);
                break;
            }
            imported += 1;
        }
        self.save()?;
        outcome.map(|_| imported)
    }

    /// Read a JSON array of track payloads and import it
    pub fn import_json_file(&mut self, path: &Path, overwrite: bool) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let tracks: Vec<Track> = serde_json::from_str(&content)?;
        self.import_tracks(tracks, overwrite)
    }

    pub fn remove_track(&mut self, id: &str) -> Result<Track> {
        let removed = self.tracks.remove(id).ok_or_else(|| {
            Error::NotFound(format!("Track with id {:?} does not exist", id))
        })?;
        self.save()?;
        Ok(removed)
    }

    /// All tracks, ordered by id
    pub fn list_tracks(&self) -> Vec<&Track> {
        self.tracks.values().collect()
    }

    /// Case-insensitive substring search over title, artist, album, genre and moods
    pub fn search(&self, query: &str) -> Vec<&Track> {
        let query_lower = query.to_lowercase();
        self.tracks
            .values()
            .filter(|track| track.matches(&query_lower))
            .collect()
    }

    /// Apply a typed metadata update and save
    pub fn update_track(&mut self, id: &str, update: TrackUpdate) -> Result<&Track> {
        let track = self.tracks.get_mut(id).ok_or_else(|| track_not_found(id))?;
        update.apply_to(track);
        self.save()?;
        TrackLibrary::get_track(&*self, id)
    }

    /// Update a single field by name
    ///
    /// Unknown field names are rejected with `InvalidField` before the track
    /// is touched.
    pub fn update_track_field(
        &mut self,
        id: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<&Track> {
        TrackLibrary::get_track(&*self, id)?;
        let update = TrackUpdate::default().with_field(field, value)?;
        self.update_track(id, update)
    }

    /// Most played tracks first
    pub fn top_tracks(&self, limit: usize) -> Vec<&Track> {
        let mut tracks = self.list_tracks();
        tracks.sort_by(|a, b| b.play_count.cmp(&a.play_count));
        tracks.truncate(limit);
        tracks
    }

    /// Most recently played tracks first; never-played tracks are excluded
    pub fn recently_played(&self, limit: usize) -> Vec<&Track> {
        let mut tracks: Vec<&Track> = self
            .tracks
            .values()
            .filter(|track| track.last_played.is_some())
            .collect();
        tracks.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        tracks.truncate(limit);
        tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl TrackLibrary for MusicLibrary {
    fn get_track(&self, id: &str) -> Result<&Track> {
        self.tracks.get(id).ok_or_else(|| track_not_found(id))
    }

    fn get_track_mut(&mut self, id: &str) -> Result<&mut Track> {
        self.tracks.get_mut(id).ok_or_else(|| track_not_found(id))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> MusicLibrary {
        let mut library = MusicLibrary::in_memory();
        library
            .import_tracks(
                vec![
                    Track::new("1", "Slow Tide", "Marin", 240, "Ambient").with_moods(["calm"]),
                    Track::new("2", "Riot Bell", "Ferro", 180, "Rock").with_moods(["Energetic"]),
                    Track::new("3", "Glass Room", "Marin", 200, "Electronic")
                        .with_album("Panes"),
                ],
                false,
            )
            .unwrap();
        library
    }

    #[test]
    fn test_mark_played_accumulates() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut track = Track::new("1", "A", "A", 120, "Ambient");
        track.mark_played(at);
        track.mark_played(at);
        assert_eq!(track.play_count, 2);
        assert_eq!(track.last_played, Some(at));
    }

    #[test]
    fn test_add_duplicate_requires_overwrite() {
        let mut library = sample();
        let replacement = Track::new("1", "Slow Tide (Edit)", "Marin", 200, "Ambient");

        let err = library.add_track(replacement.clone(), false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        library.add_track(replacement, true).unwrap();
        assert_eq!(library.get_track("1").unwrap().title, "Slow Tide (Edit)");
    }

    #[test]
    fn test_unknown_track_not_found() {
        let mut library = sample();
        assert!(library.get_track("99").unwrap_err().is_not_found());
        assert!(library.get_track_mut("99").unwrap_err().is_not_found());
        assert!(library.remove_track("99").unwrap_err().is_not_found());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let library = sample();
        let ids = |tracks: Vec<&Track>| tracks.iter().map(|t| t.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(library.search("marin")), vec!["1", "3"]);
        assert_eq!(ids(library.search("energetic")), vec!["2"]);
        assert_eq!(ids(library.search("PANES")), vec!["3"]);
        assert!(library.search("jazz").is_empty());
    }

    #[test]
    fn test_update_track_field_dispatch() {
        let mut library = sample();
        let track = library
            .update_track_field("2", "genre", serde_json::json!("Punk"))
            .unwrap();
        assert_eq!(track.genre, "Punk");

        let err = library
            .update_track_field("2", "colour", serde_json::json!("red"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidField(_)));

        let err = library
            .update_track_field("42", "genre", serde_json::json!("Punk"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_track_returns_updated_track() {
        let mut library = sample();
        let update = TrackUpdate {
            artist: Some("Marin & Co".to_string()),
            bpm: Some(Some(84)),
            ..TrackUpdate::default()
        };

        let track = library.update_track("3", update).unwrap();
        assert_eq!(track.id, "3");
        assert_eq!(track.artist, "Marin & Co");
        assert_eq!(track.bpm, Some(84));
        assert_eq!(track.album, "Panes");

        let err = library.update_track("42", TrackUpdate::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_top_and_recent() {
        let mut library = sample();
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        library.get_track_mut("3").unwrap().mark_played(early);
        library.get_track_mut("3").unwrap().mark_played(early);
        library.get_track_mut("2").unwrap().mark_played(late);

        let top: Vec<_> = library.top_tracks(2).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(top, vec!["3", "2"]);

        let recent: Vec<_> = library.recently_played(10).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(recent, vec!["2", "3"]);
    }

    #[test]
    fn test_import_payload_defaults() {
        let track: Track = serde_json::from_str(r#"{"id": "9", "title": "Bare"}"#).unwrap();
        assert_eq!(track.artist, "Unknown");
        assert_eq!(track.album, "Unknown");
        assert_eq!(track.genre, "Unknown");
        assert_eq!(track.duration_seconds, 0);
        assert!(track.moods.is_empty());
        assert_eq!(track.play_count, 0);
    }
}
