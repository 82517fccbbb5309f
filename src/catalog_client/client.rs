//! reqwest-backed client of the Spotify Web API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{SpotifyArtist, SpotifyPage, SpotifyPlayHistory, SpotifyTrack};
use super::CatalogClient;
use crate::config::CatalogSettings;
use crate::server::metrics;
use crate::wrapped::models::{ArtistRecord, RecentPlay, TimeRange, TrackRecord};

/// Largest page the Web API accepts.
pub const MAX_PAGE_SIZE: usize = 50;

pub struct SpotifyCatalogClient {
    client: reqwest::Client,
    api_base_url: String,
    accounts_base_url: String,
    client_id: Option<String>,
    redirect_uri: String,
    scopes: String,
}

fn spotify_time_range(time_range: TimeRange) -> &'static str {
    match time_range {
        TimeRange::Short => "short_term",
        TimeRange::Medium => "medium_term",
        TimeRange::Long => "long_term",
    }
}

impl SpotifyCatalogClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            accounts_base_url: settings.accounts_base_url.trim_end_matches('/').to_string(),
            client_id: settings.client_id.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            scopes: settings.scopes.clone(),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}{}", self.api_base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", path))?;

        if !response.status().is_success() {
            anyhow::bail!("Request to {} failed with status: {}", path, response.status());
        }

        let page: SpotifyPage<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", path))?;
        debug!("Fetched {} items from {}", page.items.len(), path);
        Ok(page.items)
    }

    /// Upstream failures degrade to no data.
    fn or_empty<T>(endpoint: &str, result: Result<Vec<T>>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(err) => {
                warn!("Catalog fetch {} failed: {:#}", endpoint, err);
                metrics::record_catalog_fetch_failure(endpoint);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl CatalogClient for SpotifyCatalogClient {
    async fn fetch_top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: usize,
    ) -> Vec<TrackRecord> {
        let query = [
            ("time_range", spotify_time_range(time_range).to_string()),
            ("limit", limit.min(MAX_PAGE_SIZE).to_string()),
        ];
        let result = self
            .get_page::<SpotifyTrack>(access_token, "/me/top/tracks", &query)
            .await;
        Self::or_empty("top_tracks", result)
            .iter()
            .map(SpotifyTrack::to_track_record)
            .collect()
    }

    async fn fetch_top_artists(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: usize,
    ) -> Vec<ArtistRecord> {
        let query = [
            ("time_range", spotify_time_range(time_range).to_string()),
            ("limit", limit.min(MAX_PAGE_SIZE).to_string()),
        ];
        let result = self
            .get_page::<SpotifyArtist>(access_token, "/me/top/artists", &query)
            .await;
        Self::or_empty("top_artists", result)
            .iter()
            .map(SpotifyArtist::to_artist_record)
            .collect()
    }

    async fn fetch_recently_played(&self, access_token: &str, limit: usize) -> Vec<RecentPlay> {
        let query = [("limit", limit.min(MAX_PAGE_SIZE).to_string())];
        let result = self
            .get_page::<SpotifyPlayHistory>(access_token, "/me/player/recently-played", &query)
            .await;
        Self::or_empty("recently_played", result)
            .iter()
            .filter_map(SpotifyPlayHistory::to_recent_play)
            .collect()
    }

    /// None when no client id is configured.
    fn authorize_url(&self, state: &str) -> Option<String> {
        let client_id = self.client_id.as_ref()?;
        let url = reqwest::Url::parse_with_params(
            &format!("{}/authorize", self.accounts_base_url),
            &[
                ("client_id", client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scopes.as_str()),
                ("state", state),
                ("show_dialog", "true"),
            ],
        )
        .ok()?;
        Some(url.to_string())
    }
}
