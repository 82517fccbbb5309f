//! Ranking of genres and popularity extremes over fetched pools.

use std::collections::HashMap;

use super::genre;
use super::models::{ArtistRecord, GenreTally, TrackRecord};

/// Maximum number of genres reported in a wrap.
pub const TOP_GENRES_LIMIT: usize = 5;

// Sentinels for records without a score, chosen outside 0-100 so any real
// score beats them.
const MIN_FALLBACK_SCORE: i16 = 101;
const MAX_FALLBACK_SCORE: i16 = -1;

/// Anything carrying an upstream popularity score.
pub trait Popular {
    fn popularity(&self) -> Option<u8>;
}

impl Popular for TrackRecord {
    fn popularity(&self) -> Option<u8> {
        self.popularity
    }
}

impl Popular for ArtistRecord {
    fn popularity(&self) -> Option<u8> {
        self.popularity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Min,
    Max,
}

/// Counts the first listed genre of every artist and returns the most
/// frequent ones, at most [`TOP_GENRES_LIMIT`].
///
/// Ties keep the order in which genres were first seen. Percentages are
/// taken against `pool_size`, the nominal number of artists requested
/// upstream, not the number actually received.
pub fn top_genres(artists: &[ArtistRecord], pool_size: usize) -> Vec<GenreTally> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<(String, u32)> = Vec::new();

    for artist in artists {
        let genre = genre::normalize(artist.genres.first().map(String::as_str));
        match positions.get(&genre) {
            Some(&index) => tallies[index].1 += 1,
            None => {
                positions.insert(genre.clone(), tallies.len());
                tallies.push((genre, 1));
            }
        }
    }

    // Stable, so equal counts stay in first-seen order.
    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies.truncate(TOP_GENRES_LIMIT);

    let denominator = pool_size.max(artists.len());
    let mut budget: u32 = 100;
    tallies
        .into_iter()
        .map(|(genre, count)| {
            let percentage = percentage_of(count, denominator).min(budget);
            budget -= percentage;
            GenreTally {
                genre,
                count,
                percentage,
            }
        })
        .collect()
}

fn percentage_of(count: u32, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    // Integer half-up, exact .5 shares round away from zero.
    let denominator = denominator as u64;
    ((200 * count as u64 + denominator) / (2 * denominator)) as u32
}

/// Returns the least or most popular item, the first one on ties.
pub fn extremum<T: Popular>(items: &[T], direction: Direction) -> Option<&T> {
    let score = |item: &T| -> i16 {
        match (item.popularity(), direction) {
            (Some(popularity), _) => popularity as i16,
            (None, Direction::Min) => MIN_FALLBACK_SCORE,
            (None, Direction::Max) => MAX_FALLBACK_SCORE,
        }
    };

    let mut best: Option<(&T, i16)> = None;
    for item in items {
        let item_score = score(item);
        let better = match best {
            None => true,
            Some((_, best_score)) => match direction {
                Direction::Min => item_score < best_score,
                Direction::Max => item_score > best_score,
            },
        };
        if better {
            best = Some((item, item_score));
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(name: &str, genres: &[&str]) -> ArtistRecord {
        ArtistRecord {
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            image_url: None,
            popularity: Some(50),
        }
    }

    fn track(name: &str, popularity: Option<u8>) -> TrackRecord {
        TrackRecord {
            name: name.to_string(),
            primary_artist_name: "Someone".to_string(),
            primary_artist_id: None,
            album_image_url: None,
            preview_url: None,
            popularity,
        }
    }

    #[test]
    fn counts_only_the_first_genre() {
        let artists = vec![
            artist("A", &["indie pop", "hip hop"]),
            artist("B", &["hip hop"]),
            artist("C", &["indie pop"]),
        ];
        let genres = top_genres(&artists, 50);
        assert_eq!(genres[0].genre, "Indie Pop");
        assert_eq!(genres[0].count, 2);
        assert_eq!(genres[0].percentage, 4);
        assert_eq!(genres[1].genre, "Hip Hop");
        assert_eq!(genres[1].count, 1);
        assert_eq!(genres[1].percentage, 2);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let artists = vec![
            artist("A", &["jazz"]),
            artist("B", &["rock"]),
            artist("C", &["rock"]),
            artist("D", &["jazz"]),
            artist("E", &["blues"]),
        ];
        let names: Vec<_> = top_genres(&artists, 50)
            .into_iter()
            .map(|t| t.genre)
            .collect();
        assert_eq!(names, vec!["Jazz", "Rock", "Blues"]);
    }

    #[test]
    fn artists_without_genres_are_unknown() {
        let artists = vec![artist("A", &[]), artist("B", &[])];
        let genres = top_genres(&artists, 50);
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].genre, genre::UNKNOWN_GENRE);
        assert_eq!(genres[0].count, 2);
    }

    #[test]
    fn at_most_five_sorted_and_bounded() {
        let labels = ["a", "b", "c", "d", "e", "f", "g", "b", "c", "c"];
        let artists: Vec<_> = labels.iter().map(|g| artist(g, &[*g])).collect();
        let genres = top_genres(&artists, 50);
        assert_eq!(genres.len(), 5);
        assert!(genres.windows(2).all(|w| w[0].count >= w[1].count));
        assert!(genres.iter().map(|g| g.percentage).sum::<u32>() <= 100);
    }

    #[test]
    fn rounding_never_pushes_the_sum_past_one_hundred() {
        // 2/6 -> 33, four times 1/6 -> 17 would total 101.
        let labels = ["a", "a", "b", "c", "d", "e"];
        let artists: Vec<_> = labels.iter().map(|g| artist(g, &[*g])).collect();
        let genres = top_genres(&artists, 6);
        assert_eq!(genres.iter().map(|g| g.percentage).sum::<u32>(), 100);
        assert_eq!(genres[0].percentage, 33);
        assert_eq!(genres[4].percentage, 16);
    }

    #[test]
    fn half_shares_round_up() {
        let rock: Vec<ArtistRecord> = (0..23).map(|_| artist("x", &["rock"])).collect();
        let tallies = top_genres(&rock, 40);
        assert_eq!(tallies[0].count, 23);
        assert_eq!(tallies[0].percentage, 58);

        let tallies = top_genres(&[artist("x", &["jazz"])], 8);
        assert_eq!(tallies[0].percentage, 13);

        let tallies = top_genres(&[artist("x", &["jazz"])], 3);
        assert_eq!(tallies[0].percentage, 33);
    }

    #[test]
    fn empty_pool_gives_no_genres() {
        assert!(top_genres(&[], 50).is_empty());
        assert!(top_genres(&[], 0).is_empty());
    }

    #[test]
    fn extremum_of_nothing_is_none() {
        let empty: Vec<TrackRecord> = vec![];
        assert!(extremum(&empty, Direction::Min).is_none());
        assert!(extremum(&empty, Direction::Max).is_none());
    }

    #[test]
    fn extremum_is_stable_on_ties() {
        let tracks = vec![
            track("eighty", Some(80)),
            track("first thirty", Some(30)),
            track("second thirty", Some(30)),
            track("ninety", Some(90)),
        ];
        assert_eq!(
            extremum(&tracks, Direction::Min).unwrap().name,
            "first thirty"
        );
        assert_eq!(extremum(&tracks, Direction::Max).unwrap().name, "ninety");
    }

    #[test]
    fn missing_popularity_never_wins() {
        let tracks = vec![track("unknown", None), track("zero", Some(0))];
        assert_eq!(extremum(&tracks, Direction::Min).unwrap().name, "zero");
        let tracks = vec![track("unknown", None), track("hundred", Some(100))];
        assert_eq!(extremum(&tracks, Direction::Max).unwrap().name, "hundred");

        let only_unknown = vec![track("unknown", None)];
        assert_eq!(
            extremum(&only_unknown, Direction::Max).unwrap().name,
            "unknown"
        );
    }
}
