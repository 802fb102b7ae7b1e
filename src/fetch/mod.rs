//! Fetching player data from the ranking API.
//!
//! - `HistoryPage`: the count/offset paging contract, including the extra
//!   anchor record requested for offset pages
//! - `HistorySource`: where profiles and history pages come from
//! - `ApiClient`: HTTP implementation backed by reqwest
//! - `StaticSource`: in-memory implementation over saved responses
//! - `load_history`: profile + page + grouping in one call

mod client;

pub use client::ApiClient;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{current_rating, group_matches, CurrentRating};
use crate::models::{HistoryResponse, MatchSet, PlayerId, PlayerProfile, Tag};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} has no rated characters")]
    NoCharacters(PlayerId),
}

/// One page of match history.
///
/// Offset pages ask the API for one extra, newer game. That record is the
/// anchor: it is not displayed, it only supplies the rating the newest
/// displayed game led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub count: usize,
    pub offset: usize,
}

impl HistoryPage {
    pub fn new(count: usize, offset: usize) -> Self {
        Self {
            count: count.max(1),
            offset,
        }
    }

    /// The most recent `count` games.
    pub fn first(count: usize) -> Self {
        Self::new(count, 0)
    }

    pub fn has_offset(&self) -> bool {
        self.offset > 0
    }

    /// `(count, offset)` as sent to the API.
    pub fn request_params(&self) -> (usize, usize) {
        if self.has_offset() {
            (self.count + 1, self.offset - 1)
        } else {
            (self.count, 0)
        }
    }

    /// Whether an older page may exist, given how many records came back.
    pub fn has_next(&self, returned: usize) -> bool {
        let anchor = usize::from(self.has_offset());
        returned.saturating_sub(anchor) >= self.count
    }

    /// The next, older page.
    pub fn next(&self) -> Self {
        Self::new(self.count, self.offset + self.count)
    }

    /// The previous, newer page. Clamped at the first page.
    pub fn prev(&self) -> Self {
        Self::new(self.count, self.offset.saturating_sub(self.count))
    }
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self::first(100)
    }
}

/// A source of player profiles and history pages.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Get a player's profile with live per-character ratings.
    async fn player(&self, id: PlayerId) -> Result<PlayerProfile, FetchError>;

    /// Get one page of a player's history on a character, newest first.
    async fn history(
        &self,
        id: PlayerId,
        char_short: &str,
        page: HistoryPage,
    ) -> Result<HistoryResponse, FetchError>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Serves previously saved API responses.
#[derive(Debug, Clone)]
pub struct StaticSource {
    player: PlayerProfile,
    history: HistoryResponse,
}

impl StaticSource {
    pub fn new(player: PlayerProfile, history: HistoryResponse) -> Self {
        Self { player, history }
    }

    /// Build from the raw JSON bodies of the player and history endpoints.
    pub fn from_json(player: &str, history: &str) -> Result<Self, FetchError> {
        Ok(Self::new(
            serde_json::from_str(player)?,
            serde_json::from_str(history)?,
        ))
    }

    /// Id of the saved profile.
    pub fn player_id(&self) -> PlayerId {
        self.player.id
    }
}

#[async_trait]
impl HistorySource for StaticSource {
    async fn player(&self, id: PlayerId) -> Result<PlayerProfile, FetchError> {
        if self.player.id != id {
            return Err(FetchError::PlayerNotFound(id));
        }
        Ok(self.player.clone())
    }

    async fn history(
        &self,
        _id: PlayerId,
        _char_short: &str,
        _page: HistoryPage,
    ) -> Result<HistoryResponse, FetchError> {
        Ok(self.history.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Everything needed to display one page of grouped history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub player: PlayerProfile,
    pub char_short: String,
    pub current: Option<CurrentRating>,
    pub page: HistoryPage,
    pub has_next: bool,
    /// Sets, newest first
    pub sets: Vec<MatchSet>,
    /// Opponent tags keyed by player id
    pub tags: HashMap<String, Vec<Tag>>,
}

impl HistoryView {
    pub fn games(&self) -> usize {
        self.sets.iter().map(MatchSet::len).sum()
    }
}

/// Fetch a profile and one history page, then group it.
///
/// Without `char_short` the player's highest-rated character is used.
pub async fn load_history(
    source: &dyn HistorySource,
    id: PlayerId,
    char_short: Option<&str>,
    page: HistoryPage,
) -> Result<HistoryView, FetchError> {
    let player = source.player(id).await?;
    if player.is_missing() {
        return Err(FetchError::PlayerNotFound(id));
    }

    let char_short = match char_short {
        Some(c) => c.to_string(),
        None => {
            let best = player
                .highest_rated()
                .ok_or(FetchError::NoCharacters(id))?
                .to_string();
            debug!("No character given, using highest rated: {}", best);
            best
        }
    };

    let response = source.history(id, &char_short, page).await?;
    let sets = group_matches(&response.history, &player, &char_short, page.has_offset());
    let current = current_rating(&player.ratings, &char_short);

    info!(
        source = source.name(),
        player = %id,
        char_short = %char_short,
        games = response.history.len(),
        sets = sets.len(),
        "Loaded history page"
    );

    Ok(HistoryView {
        has_next: page.has_next(response.history.len()),
        player,
        char_short,
        current,
        page,
        sets,
        tags: response.tags,
    })
}
