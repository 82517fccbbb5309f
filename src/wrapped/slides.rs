//! Projection of a [`WrapSnapshot`] into the ordered slideshow.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::game::{self, GameChallenge};
use super::models::{ArtistRecord, TrackRecord, WrapSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Intro,
    TopPicks,
    TopTracks,
    TopArtists,
    TopGenres,
    HiddenGems,
    MostPopular,
    Game,
    Outro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlidePayload {
    Game(GameChallenge),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub kind: SlideKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<SlidePayload>,
}

impl Slide {
    fn new(kind: SlideKind, title: impl Into<String>) -> Self {
        Slide {
            title: title.into(),
            kind,
            description: None,
            items: None,
            image: None,
            payload: None,
        }
    }

    fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = Some(items);
        self
    }

    fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

fn track_line(track: &TrackRecord) -> String {
    format!("{} by {}", track.name, track.primary_artist_name)
}

fn picks_items(track: Option<&TrackRecord>, artist: Option<&ArtistRecord>) -> Vec<String> {
    let mut items = Vec::new();
    if let Some(track) = track {
        items.push(format!("Track: {}", track_line(track)));
    }
    if let Some(artist) = artist {
        items.push(format!("Artist: {}", artist.name));
    }
    items
}

fn picks_image(track: Option<&TrackRecord>, artist: Option<&ArtistRecord>) -> Option<String> {
    track
        .and_then(|t| t.album_image_url.clone())
        .or_else(|| artist.and_then(|a| a.image_url.clone()))
}

/// Builds the slide sequence for `snapshot`.
///
/// The order is fixed. Every slide except the game one is a pure function
/// of the snapshot, the game slide draws a fresh challenge from `rng` and
/// is omitted when the candidate pool is empty.
pub fn compose<R: Rng + ?Sized>(
    first_name: &str,
    snapshot: &WrapSnapshot,
    rng: &mut R,
) -> Vec<Slide> {
    let mut slides = Vec::with_capacity(9);

    slides.push(
        Slide::new(SlideKind::Intro, format!("{}, your Wrapped is here!", first_name))
            .with_description(format!(
                "Let's look back at what you played over the {} term.",
                snapshot.time_range
            )),
    );

    let best_track = snapshot.top_tracks.first();
    let best_artist = snapshot.top_artists.first();
    slides.push(
        Slide::new(SlideKind::TopPicks, "Your Top Picks")
            .with_items(picks_items(best_track, best_artist))
            .with_image(picks_image(best_track, best_artist)),
    );

    slides.push(
        Slide::new(SlideKind::TopTracks, "Your Top Tracks")
            .with_items(snapshot.top_tracks.iter().map(track_line).collect())
            .with_image(best_track.and_then(|t| t.album_image_url.clone())),
    );

    slides.push(
        Slide::new(SlideKind::TopArtists, "Your Top Artists")
            .with_items(snapshot.top_artists.iter().map(|a| a.name.clone()).collect())
            .with_image(best_artist.and_then(|a| a.image_url.clone())),
    );

    slides.push(
        Slide::new(SlideKind::TopGenres, "Your Favorite Genres").with_items(
            snapshot
                .top_genres
                .iter()
                .map(|g| format!("{} ({}%)", g.genre, g.percentage))
                .collect(),
        ),
    );

    let least_track = snapshot.least_popular_track.as_ref();
    let least_artist = snapshot.least_popular_artist.as_ref();
    slides.push(
        Slide::new(SlideKind::HiddenGems, "Your Hidden Gems")
            .with_description("The least popular picks in your rotation.")
            .with_items(picks_items(least_track, least_artist))
            .with_image(picks_image(least_track, least_artist)),
    );

    let most_track = snapshot.most_popular_track.as_ref();
    let most_artist = snapshot.most_popular_artist.as_ref();
    slides.push(
        Slide::new(SlideKind::MostPopular, "Your Most Popular Picks")
            .with_description("The crowd favorites you share with everyone else.")
            .with_items(picks_items(most_track, most_artist))
            .with_image(picks_image(most_track, most_artist)),
    );

    match game::new_challenge(&snapshot.game_candidate_pool, rng) {
        Ok(challenge) => {
            let mut slide = Slide::new(SlideKind::Game, "Guess the Song")
                .with_description(format!("Unscramble this title: {}", challenge.scrambled_name))
                .with_image(challenge.image_url.clone());
            slide.payload = Some(SlidePayload::Game(challenge));
            slides.push(slide);
        }
        Err(err) => debug!("Skipping game slide: {}", err),
    }

    slides.push(
        Slide::new(SlideKind::Outro, format!("Thanks for listening, {}!", first_name))
            .with_description("See you next year."),
    );

    slides
}
