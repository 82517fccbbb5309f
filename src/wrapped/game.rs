//! "Guess the song" mini game.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use super::models::TrackRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Cannot build a challenge from an empty candidate pool")]
    EmptyPool,
}

/// A scrambled track name together with its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameChallenge {
    pub scrambled_name: String,
    pub answer: String,
    pub image_url: Option<String>,
}

/// Shuffles the characters of every whitespace-separated token.
///
/// Tokens made of a single character are left alone. The result may equal
/// the input.
pub fn scramble<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    name.split_whitespace()
        .map(|token| {
            let mut graphemes: Vec<&str> = token.graphemes(true).collect();
            if graphemes.len() > 1 {
                graphemes.shuffle(rng);
            }
            graphemes.concat()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Picks one random track of the pool and scrambles its name.
pub fn new_challenge<R: Rng + ?Sized>(
    pool: &[TrackRecord],
    rng: &mut R,
) -> Result<GameChallenge, GameError> {
    let track = pool.choose(rng).ok_or(GameError::EmptyPool)?;
    Ok(GameChallenge {
        scrambled_name: scramble(&track.name, rng),
        answer: track.name.clone(),
        image_url: track.album_image_url.clone(),
    })
}

/// Whole-string comparison, ignoring case and surrounding whitespace.
pub fn validate_guess(user_guess: &str, answer: &str) -> bool {
    user_guess.trim().to_lowercase() == answer.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(name: &str) -> TrackRecord {
        TrackRecord {
            name: name.to_string(),
            primary_artist_name: "Band".to_string(),
            primary_artist_id: Some("band".to_string()),
            album_image_url: Some(format!("https://img/{}", name)),
            preview_url: None,
            popularity: Some(10),
        }
    }

    fn sorted_chars(s: &str) -> Vec<char> {
        let mut chars: Vec<char> = s.chars().collect();
        chars.sort_unstable();
        chars
    }

    #[test]
    fn scramble_keeps_token_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let original = "Bohemian Rhapsody a";
        let scrambled = scramble(original, &mut rng);

        let original_tokens: Vec<_> = original.split(' ').collect();
        let scrambled_tokens: Vec<_> = scrambled.split(' ').collect();
        assert_eq!(original_tokens.len(), scrambled_tokens.len());
        for (o, s) in original_tokens.iter().zip(&scrambled_tokens) {
            assert_eq!(sorted_chars(o), sorted_chars(s));
        }
        assert_eq!(scrambled_tokens[2], "a");
    }

    #[test]
    fn scramble_collapses_whitespace() {
        let mut rng = StdRng::seed_from_u64(1);
        let scrambled = scramble("  x   y ", &mut rng);
        assert_eq!(scrambled, "x y");
    }

    #[test]
    fn scramble_keeps_grapheme_clusters() {
        let mut rng = StdRng::seed_from_u64(3);
        // "e" followed by a combining acute accent.
        let word = "ce\u{301}cile";
        let scrambled = scramble(word, &mut rng);
        assert!(scrambled.contains("e\u{301}"));
        assert_eq!(sorted_chars(word), sorted_chars(&scrambled));
    }

    #[test]
    fn same_seed_same_scramble() {
        let a = scramble("Stairway To Heaven", &mut StdRng::seed_from_u64(42));
        let b = scramble("Stairway To Heaven", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_pool_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(new_challenge(&[], &mut rng), Err(GameError::EmptyPool));
    }

    #[test]
    fn challenge_comes_from_the_pool() {
        let pool = vec![track("Yellow"), track("Clocks"), track("Fix You")];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let challenge = new_challenge(&pool, &mut rng).unwrap();
            let picked = pool.iter().find(|t| t.name == challenge.answer).unwrap();
            assert_eq!(challenge.image_url, picked.album_image_url);
            assert_eq!(
                sorted_chars(&challenge.scrambled_name.replace(' ', "")),
                sorted_chars(&challenge.answer.replace(' ', ""))
            );
        }
    }

    #[test]
    fn guess_validation() {
        assert!(validate_guess("  yellow ", "Yellow"));
        assert!(validate_guess("FIX YOU", "Fix You"));
        assert!(!validate_guess("Fix", "Fix You"));
        assert!(!validate_guess("Fixyou", "Fix You"));
    }
}
