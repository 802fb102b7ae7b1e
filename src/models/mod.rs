//! Core data models: players, match history and grouped sets.

mod history;
mod ids;
mod player;
mod set;

pub use history::*;
pub use ids::*;
pub use player::*;
pub use set::*;

#[cfg(test)]
pub(crate) use set::served::ServedSet;
