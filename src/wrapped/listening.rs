//! Secondary listening metrics derived from the recently-played log.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::models::RecentPlay;

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    #[default]
    Unknown,
}

impl TimeOfDay {
    /// Enumeration order used to break ties between buckets.
    const BUCKETS: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ListeningStats {
    pub total_minutes_listened: u64,
    pub peak_time_of_day: TimeOfDay,
    pub new_artist_count: usize,
}

/// Computes total minutes, the busiest time of day and how many artists in
/// the recent log are absent from `top_track_artist_ids`.
///
/// Each metric falls back to zero or [`TimeOfDay::Unknown`] on empty input.
pub fn analyze(
    recently_played: &[RecentPlay],
    top_track_artist_ids: &HashSet<String>,
) -> ListeningStats {
    let total_ms: u64 = recently_played.iter().map(|play| play.duration_ms).sum();

    let recent_artists: HashSet<&str> = recently_played
        .iter()
        .map(|play| play.artist_id.as_str())
        .collect();
    let new_artist_count = recent_artists
        .into_iter()
        .filter(|id| !top_track_artist_ids.contains(*id))
        .count();

    ListeningStats {
        total_minutes_listened: total_ms / MS_PER_MINUTE,
        peak_time_of_day: peak_time_of_day(recently_played),
        new_artist_count,
    }
}

fn peak_time_of_day(recently_played: &[RecentPlay]) -> TimeOfDay {
    let mut counts = [0usize; 3];
    for play in recently_played {
        let bucket = TimeOfDay::from_hour(play.played_at.hour());
        if let Some(index) = TimeOfDay::BUCKETS.iter().position(|b| *b == bucket) {
            counts[index] += 1;
        }
    }

    let mut peak = TimeOfDay::Unknown;
    let mut peak_count = 0;
    for (bucket, count) in TimeOfDay::BUCKETS.iter().zip(counts) {
        if count > peak_count {
            peak = *bucket;
            peak_count = count;
        }
    }
    peak
}
