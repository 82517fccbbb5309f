//! Wrap aggregation and presentation.
//!
//! Everything in here is synchronous and works on already fetched records,
//! randomness is always injected by the caller.

pub mod card;
pub mod duo;
mod font;
pub mod game;
pub mod genre;
pub mod listening;
pub mod models;
pub mod ranking;
pub mod slides;
pub mod snapshot;

pub use card::{card_filename, render_card, CardError};
pub use duo::{DuoError, DuoInvitation, DuoSlides};
pub use game::{GameChallenge, GameError};
pub use listening::{ListeningStats, TimeOfDay};
pub use models::{ArtistRecord, GenreTally, RecentPlay, TimeRange, TrackRecord, WrapSnapshot};
pub use slides::{Slide, SlideKind, SlidePayload};
pub use snapshot::{build_snapshot, SnapshotSettings};
