//! Spotify Web API response shapes.
//!
//! Only the fields the wraps need are modelled, with conversions into the
//! catalog-agnostic records of [`crate::wrapped::models`].

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;

use crate::wrapped::models::{ArtistRecord, RecentPlay, TrackRecord};

/// Envelope of every paged endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

/// Artist reference embedded in track objects.
#[derive(Clone, Debug, Deserialize)]
pub struct SpotifySimplifiedArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyTrack {
    /// Null for local files.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifySimplifiedArtist>,
    pub album: Option<SpotifyAlbum>,
    pub preview_url: Option<String>,
    pub popularity: Option<u8>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl SpotifyTrack {
    pub fn to_track_record(&self) -> TrackRecord {
        let primary_artist = self.artists.first();
        TrackRecord {
            name: self.name.clone(),
            primary_artist_name: primary_artist
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            primary_artist_id: primary_artist.and_then(|a| a.id.clone()),
            album_image_url: self
                .album
                .as_ref()
                .and_then(|album| album.images.first())
                .map(|image| image.url.clone()),
            preview_url: self.preview_url.clone(),
            popularity: self.popularity,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    pub popularity: Option<u8>,
}

impl SpotifyArtist {
    pub fn to_artist_record(&self) -> ArtistRecord {
        ArtistRecord {
            name: self.name.clone(),
            genres: self.genres.clone(),
            image_url: self.images.first().map(|image| image.url.clone()),
            popularity: self.popularity,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpotifyPlayHistory {
    pub track: SpotifyTrack,
    pub played_at: DateTime<Utc>,
}

impl SpotifyPlayHistory {
    /// Converts to a [`RecentPlay`] stamped in the server's local time zone.
    ///
    /// Returns None for plays of tracks or artists without a catalog id.
    pub fn to_recent_play(&self) -> Option<RecentPlay> {
        let track_id = self.track.id.clone()?;
        let artist_id = self.track.artists.first()?.id.clone()?;
        Some(RecentPlay {
            track_id,
            artist_id,
            duration_ms: self.track.duration_ms,
            played_at: self.played_at.with_timezone(&Local).fixed_offset(),
        })
    }
}
