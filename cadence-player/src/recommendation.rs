//! Track recommendations ranked from library statistics

use crate::library::{MusicLibrary, Track};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Suggests tracks by popularity, mood and similarity
pub struct RecommendationEngine<'a> {
    library: &'a MusicLibrary,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(library: &'a MusicLibrary) -> Self {
        Self { library }
    }

    /// Tracks whose moods contain `mood` (case-insensitive), most popular first
    pub fn recommend_by_mood(&self, mood: &str, limit: usize) -> Vec<&'a Track> {
        let mood_lower = mood.to_lowercase();
        let matching = self
            .library
            .list_tracks()
            .into_iter()
            .filter(|track| {
                track
                    .moods
                    .iter()
                    .any(|entry| entry.to_lowercase().contains(&mood_lower))
            })
            .collect();
        let mut ranked = rank_by_popularity(matching);
        ranked.truncate(limit);
        ranked
    }

    /// Tracks closest to `seed`
    ///
    /// Ordered by number of shared genre/mood tags (descending), then same
    /// genre first, then smallest bpm difference. The seed itself is excluded.
    pub fn recommend_similar(&self, seed: &Track, limit: usize) -> Vec<&'a Track> {
        let mut candidates: Vec<&Track> = self
            .library
            .list_tracks()
            .into_iter()
            .filter(|track| track.id != seed.id)
            .collect();
        candidates.sort_by_key(|track| {
            (
                Reverse(shared_tags(seed, track)),
                track.genre != seed.genre,
                track.bpm.unwrap_or(0).abs_diff(seed.bpm.unwrap_or(0)),
            )
        });
        candidates.truncate(limit);
        candidates
    }

    /// Most played tracks, ties broken by most recent play
    pub fn top_trending(&self, limit: usize) -> Vec<&'a Track> {
        let mut ranked = rank_by_popularity(self.library.list_tracks());
        ranked.truncate(limit);
        ranked
    }
}

fn rank_by_popularity(mut tracks: Vec<&Track>) -> Vec<&Track> {
    tracks.sort_by(|a, b| {
        (b.play_count, b.last_played).cmp(&(a.play_count, a.last_played))
    });
    tracks
}

fn tags(track: &Track) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for tag in std::iter::once(&track.genre).chain(track.moods.iter()) {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Size of the multiset intersection of the two tracks' genre and moods
fn shared_tags(a: &Track, b: &Track) -> usize {
    let a_tags = tags(a);
    let b_tags = tags(b);
    a_tags
        .iter()
        .map(|(tag, count)| (*count).min(b_tags.get(tag).copied().unwrap_or(0)))
        .sum()
}
