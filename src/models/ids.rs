//! Player identifiers.
//!
//! Ranking-site ids routinely exceed 2^53, so they are kept as `i64` end to
//! end and accepted from JSON either as a number or as a decimal string.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A player id as issued by the ranking API.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlayerId(i64);

impl PlayerId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// The API uses id `0` for hidden opponents and unknown players.
    pub fn is_placeholder(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl From<i64> for PlayerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for PlayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

struct PlayerIdVisitor;

impl<'de> Visitor<'de> for PlayerIdVisitor {
    type Value = PlayerId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 64-bit integer id as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(PlayerId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(PlayerId)
            .map_err(|_| E::custom(format!("player id {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        // Accept the "123n" BigInt spelling some clients emit.
        let digits = v.trim().trim_end_matches('n');
        digits
            .parse::<i64>()
            .map(PlayerId)
            .map_err(|_| E::custom(format!("invalid player id: {:?}", v)))
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PlayerIdVisitor)
    }
}

/// The other side of a game.
///
/// Hidden games carry opponent id `0` on the wire; that is modelled as
/// `Placeholder` so it can never be confused with a real id. Two placeholder
/// opponents compare equal, so consecutive hidden games still form one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opponent {
    Real(PlayerId),
    Placeholder,
}

impl Opponent {
    pub fn id(self) -> Option<PlayerId> {
        match self {
            Opponent::Real(id) => Some(id),
            Opponent::Placeholder => None,
        }
    }

    pub fn is_placeholder(self) -> bool {
        matches!(self, Opponent::Placeholder)
    }
}

impl From<PlayerId> for Opponent {
    fn from(id: PlayerId) -> Self {
        if id.is_placeholder() {
            Opponent::Placeholder
        } else {
            Opponent::Real(id)
        }
    }
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opponent::Real(id) => write!(f, "{}", id),
            Opponent::Placeholder => write!(f, "hidden"),
        }
    }
}

impl Serialize for Opponent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id().unwrap_or_default().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Opponent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        PlayerId::deserialize(deserializer).map(Opponent::from)
    }
}
