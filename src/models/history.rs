//! Match history records as served by the ranking API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Opponent, Tag};

/// A single finished game, seen from the subject player's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMatch {
    /// UTC timestamp, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,

    /// Subject player's rating at this game; `None` while the game is hidden
    #[serde(with = "sentinel_rating")]
    pub own_rating_value: Option<f64>,

    #[serde(default)]
    pub own_rating_deviation: f64,

    pub floor: String,

    #[serde(rename = "opponent_id")]
    pub opponent: Opponent,

    pub opponent_name: String,

    #[serde(default)]
    pub opponent_platform: String,

    #[serde(default)]
    pub opponent_character: String,

    pub opponent_character_short: String,

    #[serde(default)]
    pub opponent_rating_value: f64,

    #[serde(default)]
    pub opponent_rating_deviation: f64,

    pub result_win: bool,

    /// Subject player's win probability for the set
    #[serde(default)]
    pub odds: f64,
}

impl HistoryMatch {
    /// Whether this game carries a usable rating sample.
    pub fn has_rating(&self) -> bool {
        self.own_rating_value.is_some()
    }

    /// Key that decides set membership.
    pub fn set_key(&self) -> (Opponent, &str) {
        (self.opponent, self.opponent_character_short.as_str())
    }
}

/// Response body of the history endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Games, newest first
    pub history: Vec<HistoryMatch>,

    /// Opponent tags keyed by player id
    #[serde(default)]
    pub tags: HashMap<String, Vec<Tag>>,
}

/// Serde adapter for rating values where `0` means "unknown".
pub mod sentinel_rating {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.unwrap_or(0.0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(raw.filter(|v| *v != 0.0))
    }
}
