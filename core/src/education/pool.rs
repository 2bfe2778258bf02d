//! Question pool
//!
//! Resolves the candidate questions for a step: questions at the requested
//! level, or failing that at the nearest level inside the floor/ceiling
//! window, minus every question already used in the attempt. An empty result
//! is the normal exhaustion signal, not an error.
//!
//! A step costs at most two catalog queries whatever the width of the level
//! range: one for the levels that still hold candidates, one for the
//! questions at the chosen level.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use crate::education::adaptive_difficulty::DifficultyState;
use crate::education::bounds::LevelRange;
use crate::education::collaborators::{CollaboratorResult, QuestionCatalog};
use crate::education::model::{Level, QuestionId};

/// Level and window a pool query is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRequest {
    /// Requested level
    pub level: Level,

    /// Optional floor hint
    pub floor: Option<Level>,

    /// Optional ceiling hint
    pub ceiling: Option<Level>,

    /// Configured level range
    pub range: LevelRange,
}

impl PoolRequest {
    /// Build a request from the difficulty state
    ///
    /// A state flagged for rebuild carries no usable hints.
    pub fn from_state(state: &DifficultyState, range: LevelRange) -> Self {
        let (floor, ceiling) = if state.rebuild {
            (None, None)
        } else {
            (state.min_level, state.max_level)
        };

        Self {
            level: state.current_level,
            floor,
            ceiling,
            range,
        }
    }

    /// Levels the pool may draw from, `None` when the hints exclude them all
    pub fn window(&self) -> Option<LevelRange> {
        self.range.narrow(self.floor, self.ceiling)
    }

    /// Level in `available` nearest to the requested one, lower level on ties
    pub fn nearest_level(&self, available: &BTreeSet<Level>) -> Option<Level> {
        let below = available.range(..=self.level).next_back().copied();
        let above = available.range(self.level..).next().copied();
        let distance = |level: Level| (i64::from(level) - i64::from(self.level)).abs();

        match (below, above) {
            (Some(below), Some(above)) if distance(above) < distance(below) => Some(above),
            (Some(below), _) => Some(below),
            (None, above) => above,
        }
    }
}

/// Candidate lookup over a question catalog
#[derive(Clone)]
pub struct QuestionPool {
    catalog: Arc<dyn QuestionCatalog>,
}

impl QuestionPool {
    pub fn new(catalog: Arc<dyn QuestionCatalog>) -> Self {
        Self { catalog }
    }

    /// Eligible questions for the request, never containing an excluded id
    pub fn fetch(&self, exclude: &BTreeSet<QuestionId>, request: &PoolRequest) -> CollaboratorResult<BTreeSet<QuestionId>> {
        let Some(window) = request.window() else {
            debug!(
                "Pool window empty for level {} (floor={:?}, ceiling={:?})",
                request.level, request.floor, request.ceiling
            );
            return Ok(BTreeSet::new());
        };

        let available = self.catalog.levels_with_questions(window, exclude)?;
        let Some(level) = request.nearest_level(&available) else {
            debug!(
                "Pool exhausted for level {} (floor={:?}, ceiling={:?}, excluded={})",
                request.level,
                request.floor,
                request.ceiling,
                exclude.len()
            );
            return Ok(BTreeSet::new());
        };

        let mut candidates = self.catalog.questions_at_level(level, exclude)?;
        candidates.retain(|id| !exclude.contains(id));

        debug!(
            "Pool found {} candidate(s) at level {} (requested {})",
            candidates.len(),
            level,
            request.level
        );
        Ok(candidates)
    }
}
