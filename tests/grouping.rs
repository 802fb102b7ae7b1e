//! Grouping behaviour over whole history pages.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use puddle_sets::calculate::group_matches;
use puddle_sets::fetch::{load_history, HistoryPage, StaticSource};
use puddle_sets::models::{
    CharacterRating, HistoryMatch, MatchSet, Opponent, PlayerId, PlayerProfile,
};

const OPPONENTS: [i64; 4] = [0, 5, 7, 9];
const CHARACTERS: [&str; 2] = ["SO", "KY"];

fn player(rating: Option<f64>) -> PlayerProfile {
    PlayerProfile {
        id: PlayerId::new(1),
        name: "Tester".to_string(),
        ratings: rating
            .map(|rating| CharacterRating {
                rating,
                deviation: 40.0,
                char_short: "SO".to_string(),
                character: "Sol Badguy".to_string(),
                match_count: 0,
                top_char: 0,
                top_defeated: None,
                top_rating: None,
            })
            .into_iter()
            .collect(),
        platform: "PC".to_string(),
        status: "Public".to_string(),
        top_global: 0,
        tags: vec![],
    }
}

/// One generated game, oldest first.
#[derive(Debug, Clone, Copy)]
struct GameSeed {
    opponent: usize,
    character: usize,
    win: bool,
    step: i32,
    unrated: bool,
}

/// Build a newest-first page from games listed oldest first. Games against
/// the hidden opponent never carry a rating; any other game may be unrated
/// too, so sets can mix rated and unrated games.
fn page(games: &[GameSeed]) -> Vec<HistoryMatch> {
    let mut rating = 1500.0;
    let mut out: Vec<HistoryMatch> = games
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let opponent = Opponent::from(PlayerId::new(OPPONENTS[g.opponent]));
            let own_rating_value = if opponent.is_placeholder() || g.unrated {
                None
            } else {
                rating += f64::from(g.step) * 0.75;
                Some(rating)
            };
            HistoryMatch {
                timestamp: format!("t{:03}", i),
                own_rating_value,
                own_rating_deviation: 50.0,
                floor: "99".to_string(),
                opponent,
                opponent_name: format!("player-{}", OPPONENTS[g.opponent]),
                opponent_platform: "PC".to_string(),
                opponent_character: String::new(),
                opponent_character_short: CHARACTERS[g.character].to_string(),
                opponent_rating_value: 1500.0,
                opponent_rating_deviation: 50.0,
                result_win: g.win,
                odds: 0.5,
            }
        })
        .collect();
    out.reverse();
    out
}

fn game_strategy() -> impl Strategy<Value = GameSeed> {
    (
        0usize..4,
        0usize..2,
        any::<bool>(),
        -40i32..40,
        prop::bool::weighted(0.3),
    )
        .prop_map(|(opponent, character, win, step, unrated)| GameSeed {
            opponent,
            character,
            win,
            step,
            unrated,
        })
}

fn games_strategy() -> impl Strategy<Value = Vec<GameSeed>> {
    prop::collection::vec(game_strategy(), 0..40)
}

fn flatten(sets: &[MatchSet]) -> Vec<HistoryMatch> {
    sets.iter()
        .flat_map(|s| s.matches.iter().map(|m| m.record.clone()))
        .collect()
}

fn stamp_total(sets: &[MatchSet]) -> f64 {
    sets.iter()
        .flat_map(|s| s.matches.iter())
        .filter_map(|m| m.rating_change)
        .sum()
}

fn rated(history: &[HistoryMatch]) -> Vec<f64> {
    history.iter().filter_map(|m| m.own_rating_value).collect()
}

proptest! {
    /// Sets partition the page and keep its newest-first order.
    #[test]
    fn prop_sets_partition_page(games in games_strategy()) {
        let history = page(&games);
        let sets = group_matches(&history, &player(Some(1600.0)), "SO", false);
        prop_assert_eq!(flatten(&sets), history);
    }

    /// Every set is a maximal run of one opponent and character.
    #[test]
    fn prop_sets_are_maximal_runs(games in games_strategy()) {
        let history = page(&games);
        let sets = group_matches(&history, &player(Some(1600.0)), "SO", false);

        for set in &sets {
            prop_assert!(!set.is_empty());
            prop_assert!(set.matches.iter().all(|m| set.accepts(&m.record)));
        }
        for pair in sets.windows(2) {
            prop_assert!(!pair[0].accepts(&pair[1].matches[0].record));
        }
    }

    /// Set tallies match their games.
    #[test]
    fn prop_tallies(games in games_strategy()) {
        let history = page(&games);
        let sets = group_matches(&history, &player(Some(1600.0)), "SO", false);

        for set in &sets {
            let wins = set.matches.iter().filter(|m| m.record.result_win).count();
            prop_assert_eq!(set.wins as usize, wins);
            prop_assert_eq!((set.wins + set.losses) as usize, set.len());
        }
    }

    /// Unrated games never carry a delta.
    #[test]
    fn prop_unrated_games_unstamped(games in games_strategy()) {
        let history = page(&games);
        let sets = group_matches(&history, &player(Some(1600.0)), "SO", false);

        for m in sets.iter().flat_map(|s| s.matches.iter()) {
            if !m.record.has_rating() {
                prop_assert!(m.rating_change.is_none());
            }
        }
    }

    /// Each rated game but the newest carries the step to the next rated
    /// game, and every set is credited exactly the stamps it holds.
    #[test]
    fn prop_stamps_follow_rated_chain(games in games_strategy(), baseline in 1000.0f64..2000.0) {
        let history = page(&games);
        let sets = group_matches(&history, &player(Some(baseline)), "SO", false);

        let stamped: Vec<(f64, Option<f64>)> = sets
            .iter()
            .flat_map(|s| s.matches.iter())
            .filter_map(|m| m.record.own_rating_value.map(|r| (r, m.rating_change)))
            .collect();
        let mut newer = baseline;
        for (rating, stamp) in stamped {
            prop_assert!(stamp.is_some());
            prop_assert!((stamp.unwrap_or_default() - (newer - rating)).abs() < 1e-6);
            newer = rating;
        }

        for set in &sets {
            let held: f64 = set.matches.iter().filter_map(|m| m.rating_change).sum();
            prop_assert!((set.rating_change - held).abs() < 1e-6);
        }
    }

    /// Deltas telescope from the oldest rated game to the baseline, and set
    /// totals add up to the same amount.
    #[test]
    fn prop_deltas_telescope_to_baseline(games in games_strategy(), baseline in 1000.0f64..2000.0) {
        let history = page(&games);
        let sets = group_matches(&history, &player(Some(baseline)), "SO", false);
        let ratings = rated(&history);

        let expected = ratings.last().map(|oldest| baseline - oldest).unwrap_or(0.0);
        let set_total: f64 = sets.iter().map(|s| s.rating_change).sum();
        prop_assert!((stamp_total(&sets) - expected).abs() < 1e-6);
        prop_assert!((set_total - expected).abs() < 1e-6);
    }

    /// Without a baseline the newest rated game stays unstamped.
    #[test]
    fn prop_no_baseline_leaves_newest_open(games in games_strategy()) {
        let history = page(&games);
        let sets = group_matches(&history, &player(None), "SO", false);
        let ratings = rated(&history);

        let expected = match (ratings.first(), ratings.last()) {
            (Some(newest), Some(oldest)) => newest - oldest,
            _ => 0.0,
        };
        prop_assert!((stamp_total(&sets) - expected).abs() < 1e-6);

        let newest_rated = sets
            .iter()
            .flat_map(|s| s.matches.iter())
            .find(|m| m.record.has_rating());
        if let Some(m) = newest_rated {
            prop_assert!(m.rating_change.is_none());
        }
    }

    /// Offset pages drop the anchor and use its rating as the baseline.
    #[test]
    fn prop_offset_anchor_is_baseline(games in games_strategy(), anchor_rating in 1000.0f64..2000.0) {
        let mut history = page(&games);
        let mut anchor = page(&[GameSeed {
            opponent: 1,
            character: 0,
            win: true,
            step: 0,
            unrated: false,
        }])
        .remove(0);
        anchor.own_rating_value = Some(anchor_rating);
        anchor.timestamp = "anchor".to_string();
        history.insert(0, anchor);

        let sets = group_matches(&history, &player(Some(9999.0)), "SO", true);
        prop_assert_eq!(flatten(&sets), history[1..].to_vec());

        let expected = rated(&history[1..])
            .last()
            .map(|oldest| anchor_rating - oldest)
            .unwrap_or(0.0);
        prop_assert!((stamp_total(&sets) - expected).abs() < 1e-6);
    }

    /// Grouping is a pure function of its input.
    #[test]
    fn prop_deterministic(games in games_strategy()) {
        let history = page(&games);
        let before = history.clone();
        let profile = player(Some(1600.0));

        let first = group_matches(&history, &profile, "SO", false);
        let second = group_matches(&history, &profile, "SO", false);
        prop_assert_eq!(first, second);
        prop_assert_eq!(history, before);
    }
}

const PLAYER_JSON: &str = r#"{
    "id": 9007199254740993,
    "name": "Tester",
    "platform": "PC",
    "status": "Public",
    "top_global": 0,
    "tags": [],
    "ratings": [
        {"rating": 1520.0, "deviation": 40.0, "char_short": "SO", "character": "Sol Badguy", "match_count": 5, "top_char": 0},
        {"rating": 1400.0, "deviation": 80.0, "char_short": "KY", "character": "Ky Kiske", "match_count": 2, "top_char": 0}
    ]
}"#;

const HISTORY_JSON: &str = r#"{
    "history": [
        {"timestamp": "2024-05-01 12:20:00", "own_rating_value": 1510.0, "own_rating_deviation": 40.0, "floor": "99",
         "opponent_id": 9007199254740995, "opponent_name": "Rival", "opponent_platform": "PS",
         "opponent_character": "May", "opponent_character_short": "MA",
         "opponent_rating_value": 1500.0, "opponent_rating_deviation": 40.0, "result_win": true, "odds": 0.55},
        {"timestamp": "2024-05-01 12:15:00", "own_rating_value": 0, "own_rating_deviation": 0, "floor": "99",
         "opponent_id": 0, "opponent_name": "Hidden", "opponent_platform": "PC",
         "opponent_character": "Ky Kiske", "opponent_character_short": "KY",
         "opponent_rating_value": 0, "opponent_rating_deviation": 0, "result_win": false, "odds": 0},
        {"timestamp": "2024-05-01 12:10:00", "own_rating_value": 1500.0, "own_rating_deviation": 40.0, "floor": "99",
         "opponent_id": "9007199254740997", "opponent_name": "Regular", "opponent_platform": "PC",
         "opponent_character": "Ky Kiske", "opponent_character_short": "KY",
         "opponent_rating_value": 1480.0, "opponent_rating_deviation": 40.0, "result_win": true, "odds": 0.6},
        {"timestamp": "2024-05-01 12:05:00", "own_rating_value": 1490.0, "own_rating_deviation": 40.0, "floor": "99",
         "opponent_id": "9007199254740997", "opponent_name": "Regular", "opponent_platform": "PC",
         "opponent_character": "Ky Kiske", "opponent_character_short": "KY",
         "opponent_rating_value": 1480.0, "opponent_rating_deviation": 40.0, "result_win": true, "odds": 0.6}
    ],
    "tags": {"9007199254740995": [{"tag": "Vanquisher", "style": "gold"}]}
}"#;

#[tokio::test]
async fn saved_responses_group_into_sets() {
    let source = StaticSource::from_json(PLAYER_JSON, HISTORY_JSON).unwrap();
    let id = PlayerId::new(9_007_199_254_740_993);

    let view = load_history(&source, id, None, HistoryPage::first(4))
        .await
        .unwrap();

    assert_eq!(view.char_short, "SO");
    assert!(view.has_next);
    assert_eq!(view.games(), 4);

    let summary: Vec<(String, u32, u32, String)> = view
        .sets
        .iter()
        .map(|s| {
            (
                s.opponent.to_string(),
                s.wins,
                s.losses,
                format!("{:.2}", s.rating_change),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("9007199254740995".to_string(), 1, 0, "10.00".to_string()),
            ("hidden".to_string(), 0, 1, "0.00".to_string()),
            ("9007199254740997".to_string(), 2, 0, "20.00".to_string()),
        ]
    );

    let stamps: Vec<Option<String>> = view.sets[2]
        .matches
        .iter()
        .map(|m| m.rating_change_display())
        .collect();
    assert_eq!(
        stamps,
        vec![Some("10.00".to_string()), Some("10.00".to_string())]
    );
    assert_eq!(view.sets[2].timestamp, "2024-05-01 12:05:00");
}

#[tokio::test]
async fn served_json_keeps_big_ids_exact() {
    let source = StaticSource::from_json(PLAYER_JSON, HISTORY_JSON).unwrap();
    let view = load_history(
        &source,
        PlayerId::new(9_007_199_254_740_993),
        Some("SO"),
        HistoryPage::first(100),
    )
    .await
    .unwrap();

    let json = serde_json::to_string(&view).unwrap();
    assert!(json.contains("\"opponent_id\":9007199254740995"));
    assert!(json.contains("\"opponent_id\":0"));
    assert!(json.contains("\"rating_change\":\"10.00\""));
    assert!(!view.has_next);
}
