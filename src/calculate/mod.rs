//! Derived values computed from fetched player data.
//!
//! - Current rating lookup per character
//! - Set grouping and rating-delta reconstruction (`grouping`)

pub mod grouping;

pub use grouping::group_matches;

use serde::Serialize;

use crate::models::CharacterRating;

/// A character's live rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentRating {
    pub rating: f64,
    pub deviation: f64,
}

/// Find the live rating for `char_short`. The first matching entry wins.
pub fn current_rating(ratings: &[CharacterRating], char_short: &str) -> Option<CurrentRating> {
    ratings
        .iter()
        .find(|r| r.char_short == char_short)
        .map(|r| CurrentRating {
            rating: r.rating,
            deviation: r.deviation,
        })
}

/// Calculate win rate from wins/losses.
pub fn calculate_win_rate(wins: u32, losses: u32) -> f64 {
    let total = wins + losses;
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}
