//! Set grouping and rating-delta reconstruction.
//!
//! The history endpoint returns individual games newest first. Grouping walks
//! them oldest first and folds them into sets: maximal runs of games against
//! the same opponent on the same character. Each rated game is stamped with
//! the delta to the next rated game, which is the rating that game produced.
//! Games without a rating are stepped over, so a delta can reach across
//! unrated games, or whole hidden sets, to the next rated sample. A delta is
//! credited to the set holding the game it is stamped on.
//!
//! The newest rated game has no later sample inside the page. It is corrected
//! against a baseline: the live character rating, or the rating carried by the
//! extra anchor record of a paginated request.

use tracing::debug;

use crate::calculate::current_rating;
use crate::models::{HistoryMatch, MatchSet, PlayerProfile};

/// Group a newest-first history page into newest-first sets.
///
/// With `has_offset` the first (newest) record is the pagination anchor: it is
/// not grouped and only provides the baseline for the newest rated game.
/// Otherwise the baseline is the player's live rating on `char_short`.
///
/// The input is never modified.
pub fn group_matches(
    matches: &[HistoryMatch],
    player: &PlayerProfile,
    char_short: &str,
    has_offset: bool,
) -> Vec<MatchSet> {
    if has_offset {
        match matches.split_first() {
            Some((anchor, page)) => group_with_baseline(page, anchor.own_rating_value),
            None => Vec::new(),
        }
    } else {
        let baseline = current_rating(&player.ratings, char_short).map(|r| r.rating);
        group_with_baseline(matches, baseline)
    }
}

/// Group a newest-first page, correcting the newest rated game against
/// `baseline` when one is known.
pub fn group_with_baseline(page: &[HistoryMatch], baseline: Option<f64>) -> Vec<MatchSet> {
    let grouping = page.iter().rev().fold(Grouping::default(), Grouping::step);
    let sets = grouping.finish(baseline);
    debug!(
        games = page.len(),
        sets = sets.len(),
        has_baseline = baseline.is_some(),
        "Grouped match history"
    );
    sets
}

/// Position of a rated game inside the sets built so far.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RatedGame {
    set: usize,
    index: usize,
    rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Cursor {
    #[default]
    Idle,
    Open(usize),
}

/// What an incoming game does to the open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Same opponent and character as the open set.
    Continue(usize),
    /// Close the open set, if any, and open a new one.
    CloseAndOpen,
}

/// Fold state. Sets and their games are kept oldest first until `finish`.
#[derive(Debug, Default)]
struct Grouping {
    sets: Vec<MatchSet>,
    cursor: Cursor,
    /// Newest rated game seen so far, still waiting for its delta.
    last_rated: Option<RatedGame>,
}

impl Grouping {
    fn transition(&self, game: &HistoryMatch) -> Transition {
        match self.cursor {
            Cursor::Open(set) if self.sets[set].accepts(game) => Transition::Continue(set),
            Cursor::Open(_) | Cursor::Idle => Transition::CloseAndOpen,
        }
    }

    fn step(mut self, game: &HistoryMatch) -> Self {
        let set = match self.transition(game) {
            Transition::Continue(set) => {
                self.sets[set].push(game.clone());
                set
            }
            Transition::CloseAndOpen => self.open_set(game),
        };

        // A rated game settles the delta of the previous rated game, however
        // many hidden games or sets lie between them.
        if let Some(rating) = game.own_rating_value {
            if let Some(last) = self.last_rated {
                self.stamp(last, rating - last.rating);
            }
            self.last_rated = Some(RatedGame {
                set,
                index: self.sets[set].len() - 1,
                rating,
            });
        }
        self
    }

    /// Stamp a rated game and credit the delta to the set holding it.
    fn stamp(&mut self, target: RatedGame, delta: f64) {
        let set = &mut self.sets[target.set];
        set.rating_change += delta;
        set.matches[target.index].rating_change = Some(delta);
    }

    fn open_set(&mut self, game: &HistoryMatch) -> usize {
        let set = self.sets.len();
        self.sets.push(MatchSet::open(game));
        self.cursor = Cursor::Open(set);
        set
    }

    fn finish(mut self, baseline: Option<f64>) -> Vec<MatchSet> {
        if let (Some(baseline), Some(last)) = (baseline, self.last_rated) {
            self.stamp(last, baseline - last.rating);
        }

        let mut sets = self.sets;
        sets.reverse();
        for set in &mut sets {
            set.matches.reverse();
        }
        sets
    }
}
