//! # Adaptive Administration Orchestrator
//!
//! Runs one administration step for an attempt. Stages are evaluated in order
//! and each may end the step:
//!
//! 1. requested level outside the configured range: stop
//! 2. questions attempted reached the maximum: stop, no ledger access
//! 3. read the pending slot (last slot of the ledger, if any)
//! 4. no slot and nothing attempted: reset to the starting level and fetch
//! 5. answered slot: step the difficulty ladder and fetch
//! 6. no slot but questions attempted: inconsistent attempt, stop
//! 7. unanswered slot: the question is still pending, return it unchanged
//!
//! Fetching excludes every question already used in the attempt, stops when
//! the pool is exhausted and otherwise attaches a random candidate to a new
//! ledger slot.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info, warn};

use crate::education::adaptive_difficulty::{advance, DifficultyState};
use crate::education::assessment::was_answered;
use crate::education::bounds::{in_bounds, LevelRange};
use crate::education::collaborators::Collaborators;
use crate::education::config::{ConfigResult, QuizConfiguration};
use crate::education::model::{AttemptId, AttemptRecord, LedgerRef, Level, Slot};
use crate::education::pool::{PoolRequest, QuestionPool};
use crate::education::selector::NextItemSelector;
use crate::education::strategy::{
    AdministrationResult, AdministrationStrategy, Decision, Step, StepRequest, StopKind, StopReason,
};

/// Full adaptive administration policy
pub struct AdaptiveAdministration {
    /// Quiz configuration
    config: QuizConfiguration,

    /// Validated level range
    range: LevelRange,

    /// Injected collaborators
    collaborators: Collaborators,

    /// Candidate lookup
    pool: QuestionPool,

    /// Random candidate selection
    selector: NextItemSelector,
}

impl AdaptiveAdministration {
    /// Create the orchestrator, validating the configuration
    pub fn new(config: QuizConfiguration, collaborators: Collaborators, selector: NextItemSelector) -> ConfigResult<Self> {
        config.validate()?;
        let range = config.level_range()?;
        let pool = QuestionPool::new(collaborators.catalog.clone());

        Ok(Self {
            config,
            range,
            collaborators,
            pool,
            selector,
        })
    }

    pub fn config(&self) -> &QuizConfiguration {
        &self.config
    }

    fn level_in_bounds(&self, level: Level) -> bool {
        in_bounds(level, self.range.lowest, self.range.highest)
    }

    /// Build a stop step and report it to the event sink
    fn stop(&self, attempt_id: AttemptId, kind: StopKind, difficulty: DifficultyState) -> Step {
        let message = self.config.stop_messages.message_for(kind).to_string();

        match kind {
            StopKind::AttemptStateError | StopKind::FetchFailed => {
                warn!("Attempt {} stopped: {} (level {})", attempt_id, message, difficulty.current_level)
            }
            _ => debug!("Attempt {} stopped: {}", attempt_id, message),
        }
        self.collaborators.events.record(attempt_id, &message);

        Step {
            decision: Decision::Stopped {
                reason: StopReason { kind, message },
            },
            difficulty,
        }
    }

    /// Level of the question administered in `slot`
    fn previous_level(&self, ledger_ref: LedgerRef, slot: Slot) -> AdministrationResult<Level> {
        let question = self.collaborators.ledger.question_of(ledger_ref, slot)?;
        Ok(self.collaborators.catalog.load(question)?.level)
    }

    /// Draw a new question for the attempt at the given difficulty
    fn fetch_next(&mut self, record: &AttemptRecord, difficulty: DifficultyState) -> AdministrationResult<Step> {
        let exclude = self.collaborators.excluded_questions(record)?;
        let request = PoolRequest::from_state(&difficulty, self.range);
        let candidates = self.pool.fetch(&exclude, &request)?;

        if candidates.is_empty() {
            return Ok(self.stop(record.attempt_id, StopKind::FetchFailed, difficulty));
        }

        let question = self.selector.pick(&candidates)?;
        let slot = self.collaborators.administer(record, question)?;

        info!(
            "Attempt {}: administered question {} in {} at level {}",
            record.attempt_id, question, slot, difficulty.current_level
        );
        self.collaborators.events.record(
            record.attempt_id,
            &format!("question {} administered at level {}", question, difficulty.current_level),
        );

        Ok(Step {
            decision: Decision::Ready { slot },
            difficulty,
        })
    }
}

impl AdministrationStrategy for AdaptiveAdministration {
    fn evaluate(&mut self, request: &StepRequest) -> AdministrationResult<Step> {
        let attempt_id = request.attempt_id;
        let mut difficulty = request.difficulty;

        if !self.level_in_bounds(difficulty.current_level) {
            return Ok(self.stop(attempt_id, StopKind::LevelOutOfBounds, difficulty));
        }

        let record = self.collaborators.attempts.read(attempt_id)?;
        if record.questions_attempted >= self.config.maximum_questions {
            return Ok(self.stop(attempt_id, StopKind::MaxQuestionsAttempted, difficulty));
        }

        match self.collaborators.pending_slot(&record)? {
            None if record.questions_attempted == 0 => {
                difficulty = DifficultyState::fresh(self.config.starting_level);
                if !self.level_in_bounds(difficulty.current_level) {
                    return Ok(self.stop(attempt_id, StopKind::LevelOutOfBounds, difficulty));
                }
                debug!("Attempt {} starts at level {}", attempt_id, difficulty.current_level);
            }
            None => {
                return Ok(self.stop(attempt_id, StopKind::AttemptStateError, difficulty));
            }
            Some((ledger_ref, slot)) => {
                if !was_answered(self.collaborators.ledger.as_ref(), ledger_ref, slot)? {
                    debug!("Attempt {}: {} still pending", attempt_id, slot);
                    return Ok(Step {
                        decision: Decision::Ready { slot },
                        difficulty,
                    });
                }

                let previous_level = self.previous_level(ledger_ref, slot)?;
                let mark = self.collaborators.ledger.mark_of(ledger_ref, slot)?.unwrap_or(0.0);
                difficulty = advance(difficulty, previous_level, mark, self.range);
            }
        }

        self.fetch_next(&record, difficulty)
    }
}
