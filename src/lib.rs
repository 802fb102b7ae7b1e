//! # Puddle Sets
//!
//! Match history grouping for a fighting-game ranking site.
//!
//! ## Architecture
//!
//! - **models**: API records (players, history games) and grouped sets
//! - **calculate**: Rating lookup and set grouping with rating deltas
//! - **fetch**: Ranking API client and paging
//! - **render**: Terminal output
//! - **api**: REST service serving grouped history
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod render;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "90s", "5m", "1m30s", "2h").
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let multiplier = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        let n: u64 = digits.parse().ok()?;
        total = total.checked_add(n.checked_mul(multiplier)?)?;
        digits.clear();
    }

    if !digits.is_empty() {
        return None;
    }
    Some(Duration::from_secs(total))
}
