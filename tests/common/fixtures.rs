//! Test fixture creation for the database and the fake catalog

use super::constants::*;
use anyhow::Result;
use chrono::DateTime;
use std::path::PathBuf;
use tempfile::TempDir;
use wrapped_server::store::{AuthToken, AuthTokenStore, SqliteWrapStore, UserStore};
use wrapped_server::wrapped::models::{ArtistRecord, RecentPlay, TrackRecord};

/// Session tokens of the seeded users
pub struct SeededTokens {
    pub test_user: String,
    pub other_user: String,
}

/// Creates a temporary database with two users, each holding one session
/// token.
/// Returns (temp_dir, db_path, tokens)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf, SeededTokens)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("wrapped.db");
    let store = SqliteWrapStore::new(&db_path)?;

    let issue = |handle: &str, first_name: &str| -> Result<String> {
        let user_id = store.create_user(handle, first_name)?;
        let token = AuthToken::new(user_id);
        store.add_auth_token(&token)?;
        Ok(token.value.0)
    };
    let tokens = SeededTokens {
        test_user: issue(TEST_USER, TEST_USER_FIRST_NAME)?,
        other_user: issue(OTHER_USER, OTHER_USER_FIRST_NAME)?,
    };

    Ok((dir, db_path, tokens))
}

fn track(name: &str, artist_name: &str, artist_id: &str, popularity: u8) -> TrackRecord {
    TrackRecord {
        name: name.to_string(),
        primary_artist_name: artist_name.to_string(),
        primary_artist_id: Some(artist_id.to_string()),
        album_image_url: Some(format!("https://images.test/{}.jpg", name.to_lowercase())),
        preview_url: None,
        popularity: Some(popularity),
    }
}

fn artist(name: &str, genres: &[&str], popularity: u8) -> ArtistRecord {
    ArtistRecord {
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        image_url: None,
        popularity: Some(popularity),
    }
}

pub fn test_top_tracks() -> Vec<TrackRecord> {
    vec![
        track(TRACK_1_NAME, ARTIST_1_NAME, ARTIST_1_ID, 80),
        track(TRACK_2_NAME, ARTIST_1_NAME, ARTIST_1_ID, 70),
        track(TRACK_3_NAME, ARTIST_2_NAME, ARTIST_2_ID, 40),
    ]
}

pub fn test_top_artists() -> Vec<ArtistRecord> {
    vec![
        artist(ARTIST_1_NAME, &["pop rock", "permanent wave"], 85),
        artist(ARTIST_2_NAME, &["alternative rock"], 60),
        artist(ARTIST_3_NAME, &["trip hop"], 50),
    ]
}

/// Two evening plays and one morning play, one of them by an artist absent
/// from the top tracks.
pub fn test_recent_plays() -> Vec<RecentPlay> {
    let play = |track_id: &str, artist_id: &str, duration_ms: u64, played_at: &str| RecentPlay {
        track_id: track_id.to_string(),
        artist_id: artist_id.to_string(),
        duration_ms,
        played_at: DateTime::parse_from_rfc3339(played_at).expect("Invalid fixture timestamp"),
    };
    vec![
        play("t-yellow", ARTIST_1_ID, 180_000, "2024-05-03T20:15:00+02:00"),
        play("t-roads", ARTIST_3_ID, 240_000, "2024-05-03T21:40:00+02:00"),
        play("t-glory-box", ARTIST_3_ID, 180_000, "2024-05-04T09:05:00+02:00"),
    ]
}
