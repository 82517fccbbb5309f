//! Access to the third-party music catalog holding the user's listening
//! history.

mod client;
pub mod models;

use async_trait::async_trait;

use crate::wrapped::models::{ArtistRecord, RecentPlay, TimeRange, TrackRecord};

pub use client::{SpotifyCatalogClient, MAX_PAGE_SIZE};

/// Source of the raw records a wrap is built from.
///
/// Implementations never fail: any upstream problem is logged and surfaces
/// as an empty list.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// The user's most listened tracks over `time_range`, best first.
    async fn fetch_top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: usize,
    ) -> Vec<TrackRecord>;

    /// The user's most listened artists over `time_range`, best first.
    async fn fetch_top_artists(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: usize,
    ) -> Vec<ArtistRecord>;

    async fn fetch_recently_played(&self, access_token: &str, limit: usize) -> Vec<RecentPlay>;

    /// Consent screen URL, None when this catalog cannot build one.
    fn authorize_url(&self, _state: &str) -> Option<String> {
        None
    }
}
