//! Wrap data models
//!
//! Records coming from the catalog, the derived summaries, and the
//! persisted snapshot shape.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::listening::ListeningStats;

/// Lookback window of the catalog top-items queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Short,
    #[default]
    Medium,
    Long,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Short => "short",
            TimeRange::Medium => "medium",
            TimeRange::Long => "long",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "short" => Ok(TimeRange::Short),
            "medium" => Ok(TimeRange::Medium),
            "long" => Ok(TimeRange::Long),
            _ => anyhow::bail!("Unknown time range {}", s),
        }
    }
}

/// A track as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub name: String,
    pub primary_artist_name: String,
    /// Catalog id of the primary artist, used as the discovery baseline.
    #[serde(default)]
    pub primary_artist_id: Option<String>,
    #[serde(default)]
    pub album_image_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Upstream 0-100 score.
    #[serde(default)]
    pub popularity: Option<u8>,
}

/// An artist as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub name: String,
    /// Ordered as the catalog lists them, may be empty.
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub popularity: Option<u8>,
}

/// One entry of the recently-played log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPlay {
    pub track_id: String,
    pub artist_id: String,
    pub duration_ms: u64,
    /// Playback timestamp in the listener's local offset.
    pub played_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreTally {
    pub genre: String,
    pub count: u32,
    pub percentage: u32,
}

/// Point-in-time aggregation of one user's listening statistics.
///
/// This is the opaque `wrap_data` payload persisted by the store, and the
/// input of both the slide composer and the static card renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapSnapshot {
    pub owner_id: usize,
    pub time_range: TimeRange,
    pub top_tracks: Vec<TrackRecord>,
    pub top_artists: Vec<ArtistRecord>,
    pub top_genres: Vec<GenreTally>,
    pub most_popular_track: Option<TrackRecord>,
    pub least_popular_track: Option<TrackRecord>,
    pub most_popular_artist: Option<ArtistRecord>,
    pub least_popular_artist: Option<ArtistRecord>,
    pub game_candidate_pool: Vec<TrackRecord>,
    #[serde(default)]
    pub listening: ListeningStats,
    #[serde(default)]
    pub fun_fact: String,
    pub created_at: DateTime<Utc>,
}
