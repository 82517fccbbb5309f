//! Assembly of a [`WrapSnapshot`] out of freshly fetched catalog records.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::listening::{self, ListeningStats, TimeOfDay};
use super::models::{ArtistRecord, GenreTally, RecentPlay, TimeRange, TrackRecord, WrapSnapshot};
use super::ranking::{self, Direction};

/// Sizes driving the aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSettings {
    /// Length of the top tracks and top artists lists.
    pub top_items_limit: usize,
    /// Maximum number of tracks the guessing game can draw from.
    pub candidate_pool_size: usize,
    /// Nominal artist count used as the genre percentage base.
    pub genre_pool_size: usize,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        SnapshotSettings {
            top_items_limit: 10,
            candidate_pool_size: 50,
            genre_pool_size: 50,
        }
    }
}

pub fn build_snapshot(
    owner_id: usize,
    time_range: TimeRange,
    tracks: Vec<TrackRecord>,
    artists: Vec<ArtistRecord>,
    recently_played: &[RecentPlay],
    settings: &SnapshotSettings,
    created_at: DateTime<Utc>,
) -> WrapSnapshot {
    let top_genres = ranking::top_genres(&artists, settings.genre_pool_size);

    let most_popular_track = ranking::extremum(&tracks, Direction::Max).cloned();
    let least_popular_track = ranking::extremum(&tracks, Direction::Min).cloned();
    let most_popular_artist = ranking::extremum(&artists, Direction::Max).cloned();
    let least_popular_artist = ranking::extremum(&artists, Direction::Min).cloned();

    let known_artist_ids: HashSet<String> = tracks
        .iter()
        .filter_map(|t| t.primary_artist_id.clone())
        .collect();
    let listening = listening::analyze(recently_played, &known_artist_ids);
    let fun_fact = fun_fact(&listening, &top_genres);

    let top_tracks: Vec<TrackRecord> = tracks
        .iter()
        .take(settings.top_items_limit)
        .cloned()
        .collect();
    let mut game_candidate_pool = tracks;
    game_candidate_pool.truncate(settings.candidate_pool_size);

    let mut top_artists = artists;
    top_artists.truncate(settings.top_items_limit);

    WrapSnapshot {
        owner_id,
        time_range,
        top_tracks,
        top_artists,
        top_genres,
        most_popular_track,
        least_popular_track,
        most_popular_artist,
        least_popular_artist,
        game_candidate_pool,
        listening,
        fun_fact,
        created_at,
    }
}

/// One sentence summing up the listening habits, shown on the static card.
pub fn fun_fact(listening: &ListeningStats, top_genres: &[GenreTally]) -> String {
    let mut fact = match listening.peak_time_of_day {
        TimeOfDay::Unknown => "Your listening clock is still a mystery".to_string(),
        peak => format!(
            "You listened to {} minutes of music, mostly in the {}",
            listening.total_minutes_listened,
            peak.label()
        ),
    };

    match listening.new_artist_count {
        0 => {}
        1 => fact.push_str(", discovered 1 new artist"),
        n => fact.push_str(&format!(", discovered {} new artists", n)),
    }

    match top_genres.len() {
        0 => fact.push('.'),
        1 => fact.push_str(" and stayed loyal to a single genre."),
        n => fact.push_str(&format!(" and explored {} genres.", n)),
    }
    fact
}
