//! # Adaptive Difficulty Ladder
//!
//! Discrete step-based difficulty adjustment. After each answered question the
//! level moves one step up (positive mark) or one step down (zero or negative
//! mark), never leaving the configured `[lowest, highest]` range.
//!
//! The step also produces request hints for the question pool: a floor one
//! level above a correctly answered level and a ceiling one level below an
//! incorrectly answered one. Hints narrow the pool and may empty it, which is
//! reported as exhaustion rather than as a bounds violation.
//!
//! State is carried explicitly in [`DifficultyState`], returned to the caller
//! after every step and handed back on the next one.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::trace;
use serde::{Deserialize, Serialize};

use crate::education::bounds::LevelRange;
use crate::education::model::Level;

/// Request-scoped difficulty state threaded through administration steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Level the next question is requested at
    pub current_level: Level,

    /// Lowest level the pool may draw from, if narrowed
    pub min_level: Option<Level>,

    /// Highest level the pool may draw from, if narrowed
    pub max_level: Option<Level>,

    /// Set on the first step of a fresh attempt: floor/ceiling hints are stale
    pub rebuild: bool,
}

impl DifficultyState {
    /// State requesting `level` with no pool hints
    pub fn at_level(level: Level) -> Self {
        Self {
            current_level: level,
            min_level: None,
            max_level: None,
            rebuild: false,
        }
    }

    /// State for the first step of a fresh attempt
    pub fn fresh(starting_level: Level) -> Self {
        Self {
            rebuild: true,
            ..Self::at_level(starting_level)
        }
    }
}

/// Compute the state for the next question from the previous answer
///
/// `previous_level` is the level of the question just answered and `mark` its
/// score. Hints from earlier steps are dropped; only the previous answer
/// narrows the pool.
pub fn advance(state: DifficultyState, previous_level: Level, mark: f64, range: LevelRange) -> DifficultyState {
    let mut next = DifficultyState::at_level(state.current_level);

    if mark > 0.0 {
        if previous_level < range.highest {
            next.min_level = Some(previous_level + 1);
            if previous_level == state.current_level {
                next.current_level += 1;
            }
        }
    } else if previous_level > range.lowest {
        next.max_level = Some(previous_level - 1);
        if previous_level == state.current_level {
            next.current_level -= 1;
        }
    }

    trace!(
        "Difficulty step: previous={} mark={} level {} -> {} (floor={:?}, ceiling={:?})",
        previous_level,
        mark,
        state.current_level,
        next.current_level,
        next.min_level,
        next.max_level
    );

    next
}
