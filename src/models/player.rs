//! Player profile model.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// A display tag attached to a player (e.g. tournament titles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag: String,
    pub style: String,
}

/// Best rating ever reached on a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopRating {
    pub timestamp: String,
    pub value: f64,
    pub deviation: f64,
}

/// Strongest opponent ever beaten on a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopDefeated {
    pub timestamp: String,
    pub id: PlayerId,
    pub name: String,
    pub char_short: String,
    pub value: f64,
    pub deviation: f64,
}

/// Live rating for one of the player's characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRating {
    pub rating: f64,
    pub deviation: f64,
    pub char_short: String,

    #[serde(default)]
    pub character: String,

    #[serde(default)]
    pub match_count: u32,

    /// Rank on this character's leaderboard, 0 when unranked
    #[serde(default)]
    pub top_char: u32,

    #[serde(default)]
    pub top_defeated: Option<TopDefeated>,

    #[serde(default)]
    pub top_rating: Option<TopRating>,
}

/// Response body of the player endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,

    #[serde(default)]
    pub ratings: Vec<CharacterRating>,

    #[serde(default)]
    pub platform: String,

    /// "Public", "Private" or "Cheater"
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub top_global: u32,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl PlayerProfile {
    /// The API answers unknown and private players with id 0.
    pub fn is_missing(&self) -> bool {
        self.id.is_placeholder()
    }

    /// Character short code with the highest rating. Ties keep the first entry.
    pub fn highest_rated(&self) -> Option<&str> {
        let mut best: Option<&CharacterRating> = None;
        for entry in &self.ratings {
            if best.map_or(true, |b| entry.rating > b.rating) {
                best = Some(entry);
            }
        }
        best.map(|r| r.char_short.as_str())
    }
}
