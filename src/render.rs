//! Plain-text rendering of grouped history for the terminal.

use chrono::{Local, NaiveDateTime, TimeZone, Utc};

use crate::calculate::calculate_win_rate;
use crate::fetch::HistoryView;
use crate::models::{MatchSet, Opponent};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show timestamps in local time instead of UTC
    pub local_time: bool,
    /// List every game under its set
    pub expand: bool,
}

/// Signed delta with two decimals: `+12.30`, `-4.00`, `0.00`.
pub fn format_delta(delta: f64) -> String {
    let rounded = format!("{:.2}", delta);
    if rounded == "-0.00" {
        "0.00".to_string()
    } else if delta > 0.0 && rounded != "0.00" {
        format!("+{}", rounded)
    } else {
        rounded
    }
}

/// Format an API timestamp, optionally converted to local time.
/// Unparseable input is returned unchanged.
pub fn format_timestamp(timestamp: &str, local_time: bool) -> String {
    let trimmed = timestamp.trim();
    let parsed = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok());

    match parsed {
        Some(naive) if local_time => Utc
            .from_utc_datetime(&naive)
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Some(naive) => naive.format("%Y-%m-%d %H:%M").to_string(),
        None => trimmed.to_string(),
    }
}

fn opponent_label(set: &MatchSet, view: &HistoryView) -> String {
    let tags = match set.opponent {
        Opponent::Real(id) => view.tags.get(&id.to_string()),
        Opponent::Placeholder => None,
    };
    tags.into_iter()
        .flatten()
        .fold(set.opponent_name.clone(), |label, tag| {
            format!("{} [{}]", label, tag.tag)
        })
}

/// Render one history page as a table of sets.
pub fn render_view(view: &HistoryView, options: RenderOptions) -> String {
    let mut out = format!("{} ({})", view.player.name, view.char_short);
    if let Some(current) = view.current {
        out.push_str(&format!("  {:.0} ±{:.0}", current.rating, current.deviation));
    }
    out.push_str(&format!(
        "  {} games in {} sets, offset {}\n",
        view.games(),
        view.sets.len(),
        view.page.offset
    ));

    if view.sets.is_empty() {
        out.push_str("No games on this page.\n");
    } else {
        out.push_str(&format!(
            "{:<16}  {:<9}  {:<28}  {:<4}  {:>5}  {:>5}  {:>9}\n",
            "Time", "Floor", "Opponent", "Char", "W-L", "Odds", "Change"
        ));
        for set in &view.sets {
            out.push_str(&render_set(set, view, options));
        }

        let (wins, losses) = view
            .sets
            .iter()
            .fold((0, 0), |(w, l), s| (w + s.wins, l + s.losses));
        out.push_str(&format!(
            "Page record {}-{} ({:.1}%)\n",
            wins,
            losses,
            calculate_win_rate(wins, losses) * 100.0
        ));
    }

    out.push_str(&paging_hint(view));
    out
}

fn render_set(set: &MatchSet, view: &HistoryView, options: RenderOptions) -> String {
    let mut out = format!(
        "{:<16}  {:<9}  {:<28}  {:<4}  {:>5}  {:>4.0}%  {:>9}\n",
        format_timestamp(&set.timestamp, options.local_time),
        set.floor,
        opponent_label(set, view),
        set.opponent_character_short,
        format!("{}-{}", set.wins, set.losses),
        set.odds * 100.0,
        format_delta(set.rating_change),
    );

    if options.expand {
        for game in &set.matches {
            let rating = game
                .record
                .own_rating_value
                .map(|r| format!("{:.0}", r))
                .unwrap_or_else(|| "hidden".to_string());
            let change = game
                .rating_change
                .map(format_delta)
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "    {:<16}  {:<4}  {:>7}  {:>9}\n",
                format_timestamp(&game.record.timestamp, options.local_time),
                if game.record.result_win { "W" } else { "L" },
                rating,
                change,
            ));
        }
    }
    out
}

/// Offsets of the neighbouring pages, when they exist.
fn paging_hint(view: &HistoryView) -> String {
    let mut links = Vec::new();
    if view.page.has_offset() {
        links.push(format!("newer: --offset {}", view.page.prev().offset));
    }
    if view.has_next {
        links.push(format!("older: --offset {}", view.page.next().offset));
    }
    if links.is_empty() {
        String::new()
    } else {
        format!("{}\n", links.join(", "))
    }
}
