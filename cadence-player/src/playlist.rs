//! Playlists: ordered, duplicate-free lists of track ids

use crate::library::{Track, TrackLibrary};
use cadence_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Ordered collection of track identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    track_ids: Vec<String>,
}

impl Playlist {
    /// Create a playlist from ids as given (duplicates are kept)
    pub fn new<I, S>(name: impl Into<String>, track_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            track_ids: track_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a JSON array of ids; the playlist is named after the file stem
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let track_ids: Vec<String> = serde_json::from_str(&content)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, track_ids })
    }

    pub fn track_ids(&self) -> &[String] {
        &self.track_ids
    }

    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    /// Append `track_id` unless it is already present
    pub fn add_track(&mut self, track_id: impl Into<String>) {
        let track_id = track_id.into();
        if !self.track_ids.contains(&track_id) {
            self.track_ids.push(track_id);
        }
    }

    pub fn add_tracks<I, S>(&mut self, track_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for track_id in track_ids {
            self.add_track(track_id);
        }
    }

    /// Remove `track_id` if present
    pub fn remove_track(&mut self, track_id: &str) {
        if let Some(pos) = self.track_ids.iter().position(|id| id == track_id) {
            self.track_ids.remove(pos);
        }
    }

    /// Move the entry at `old_index` to `new_index`
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> Result<()> {
        let len = self.track_ids.len();
        if old_index >= len || new_index >= len {
            return Err(Error::InvalidInput(format!(
                "Cannot move entry {} to {} in playlist of {} tracks",
                old_index, new_index, len
            )));
        }
        let track_id = self.track_ids.remove(old_index);
        self.track_ids.insert(new_index, track_id);
        Ok(())
    }

    /// Resolve every id through `library`, failing on the first unknown id
    pub fn expand<'a, L: TrackLibrary>(&self, library: &'a L) -> Result<Vec<&'a Track>> {
        self.track_ids
            .iter()
            .map(|id| library.get_track(id))
            .collect()
    }
}

/// In-memory set of playlists keyed by name
#[derive(Debug, Clone, Default)]
pub struct PlaylistCollection {
    playlists: BTreeMap<String, Playlist>,
}

impl PlaylistCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a playlist; names must be unique
    pub fn add(&mut self, playlist: Playlist) -> Result<()> {
        if self.playlists.contains_key(&playlist.name) {
            return Err(Error::AlreadyExists(format!(
                "Playlist {:?} already exists",
                playlist.name
            )));
        }
        self.playlists.insert(playlist.name.clone(), playlist);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Playlist> {
        self.playlists
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Playlist {:?} not found", name)))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Playlist> {
        self.playlists
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(format!("Playlist {:?} not found", name)))
    }

    /// Playlists ordered by name
    pub fn list(&self) -> Vec<&Playlist> {
        self.playlists.values().collect()
    }
}
