//! Grouped sets: consecutive games against the same opponent and character.

use serde::{Serialize, Serializer};

use super::{HistoryMatch, Opponent};

/// A game inside a set, annotated with the rating it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetMatch {
    #[serde(flatten)]
    pub record: HistoryMatch,

    /// Rating change from this game to the next rated game, if known
    #[serde(serialize_with = "serialize_stamp", skip_serializing_if = "Option::is_none")]
    pub rating_change: Option<f64>,
}

impl SetMatch {
    pub fn new(record: HistoryMatch) -> Self {
        Self {
            record,
            rating_change: None,
        }
    }

    /// The stamped delta as displayed, fixed to two decimals.
    pub fn rating_change_display(&self) -> Option<String> {
        self.rating_change.map(|d| format!("{:.2}", d))
    }
}

fn serialize_stamp<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_str(&format!("{:.2}", d)),
        None => serializer.serialize_none(),
    }
}

/// A maximal run of games against one opponent on one character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSet {
    #[serde(rename = "opponent_id")]
    pub opponent: Opponent,
    pub opponent_name: String,
    pub opponent_character_short: String,
    pub floor: String,

    /// Timestamp of the set's first game
    pub timestamp: String,

    /// Win probability carried from the set's first game
    pub odds: f64,

    /// Games, newest first
    pub matches: Vec<SetMatch>,

    pub wins: u32,
    pub losses: u32,

    /// Sum of the unrounded deltas attributed to this set
    pub rating_change: f64,
}

impl MatchSet {
    /// Open a set seeded from its first game.
    pub fn open(first: &HistoryMatch) -> Self {
        let mut set = Self {
            opponent: first.opponent,
            opponent_name: first.opponent_name.clone(),
            opponent_character_short: first.opponent_character_short.clone(),
            floor: first.floor.clone(),
            timestamp: first.timestamp.clone(),
            odds: first.odds,
            matches: Vec::new(),
            wins: 0,
            losses: 0,
            rating_change: 0.0,
        };
        set.push(first.clone());
        set
    }

    /// Append a game and update the tally.
    pub fn push(&mut self, record: HistoryMatch) {
        if record.result_win {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.matches.push(SetMatch::new(record));
    }

    pub fn accepts(&self, record: &HistoryMatch) -> bool {
        (self.opponent, self.opponent_character_short.as_str()) == record.set_key()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
