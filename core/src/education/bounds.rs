//! Difficulty level bounds
//!
//! A requested level outside the configured range is a hard precondition
//! failure: the orchestrator stops before touching any collaborator.

use serde::{Deserialize, Serialize};

use crate::education::model::Level;

/// Returns true iff `lowest <= level <= highest`
pub fn in_bounds(level: Level, lowest: Level, highest: Level) -> bool {
    lowest <= level && level <= highest
}

/// Inclusive `[lowest, highest]` level range of a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    /// Lowest permitted level
    pub lowest: Level,

    /// Highest permitted level
    pub highest: Level,
}

impl LevelRange {
    /// Create a range, returning `None` when `lowest > highest`
    pub fn new(lowest: Level, highest: Level) -> Option<Self> {
        (lowest <= highest).then_some(Self { lowest, highest })
    }

    /// Whether the level lies inside the range
    pub fn contains(&self, level: Level) -> bool {
        in_bounds(level, self.lowest, self.highest)
    }

    /// Intersect with optional floor/ceiling hints
    ///
    /// Returns `None` when the hints leave no level in the range.
    pub fn narrow(&self, floor: Option<Level>, ceiling: Option<Level>) -> Option<Self> {
        let lowest = floor.map_or(self.lowest, |floor| floor.max(self.lowest));
        let highest = ceiling.map_or(self.highest, |ceiling| ceiling.min(self.highest));
        Self::new(lowest, highest)
    }
}
