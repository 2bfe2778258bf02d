//! Administration strategy interface
//!
//! One administration step produces either a ready slot or a stop reason,
//! never both. Stop reasons are data: collaborator failures are the only
//! errors a step returns.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::education::adaptive_difficulty::DifficultyState;
use crate::education::collaborators::{CollaboratorError, Collaborators};
use crate::education::config::{ConfigError, ConfigResult, QuizConfiguration, StrategyKind};
use crate::education::evaluation::{DelegatedAdministration, QuestionFetcher};
use crate::education::model::{AttemptId, Slot};
use crate::education::orchestrator::AdaptiveAdministration;
use crate::education::selector::NextItemSelector;

/// Administration error types
#[derive(Error, Debug)]
pub enum AdministrationError {
    /// A collaborator failed; the caller decides whether to retry
    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Selection was attempted over an empty candidate set
    #[error("Cannot select from an empty candidate set")]
    EmptyCandidates,
}

/// Type alias for administration results
pub type AdministrationResult<T> = Result<T, AdministrationError>;

/// Why no further question is administered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    /// Requested level outside the configured range
    LevelOutOfBounds,

    /// Attempt reached the configured question count
    MaxQuestionsAttempted,

    /// No eligible question left
    FetchFailed,

    /// Attempt has answered questions but no ledger slot
    AttemptStateError,

    /// Delegated fetcher reported nothing to administer
    Delegated,
}

impl StopKind {
    /// Configuration violation: policy says stop
    pub fn is_policy(self) -> bool {
        matches!(self, StopKind::LevelOutOfBounds | StopKind::MaxQuestionsAttempted)
    }

    /// Content ran out
    pub fn is_exhaustion(self) -> bool {
        matches!(self, StopKind::FetchFailed | StopKind::Delegated)
    }
}

/// Stop criterion with its human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopReason {
    pub kind: StopKind,
    pub message: String,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of one administration step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// A question is pending in this slot
    Ready { slot: Slot },

    /// No further question will be administered
    Stopped { reason: StopReason },
}

impl Decision {
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Decision::Ready { slot } => Some(*slot),
            Decision::Stopped { .. } => None,
        }
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        match self {
            Decision::Ready { .. } => None,
            Decision::Stopped { reason } => Some(reason),
        }
    }
}

/// Input of one administration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRequest {
    /// Attempt being administered
    pub attempt_id: AttemptId,

    /// Difficulty state returned by the previous step
    pub difficulty: DifficultyState,
}

/// Output of one administration step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Ready slot or stop reason
    pub decision: Decision,

    /// Difficulty state to hand to the next step
    pub difficulty: DifficultyState,
}

/// Interchangeable administration policy
pub trait AdministrationStrategy: Send {
    /// Run one administration step for an attempt
    fn evaluate(&mut self, request: &StepRequest) -> AdministrationResult<Step>;
}

/// Build the strategy selected by the configuration
pub fn build_strategy(
    config: QuizConfiguration,
    collaborators: Collaborators,
    selector: NextItemSelector,
    fetcher: Option<Box<dyn QuestionFetcher>>,
) -> ConfigResult<Box<dyn AdministrationStrategy>> {
    config.validate()?;

    let kind = config.strategy;
    match kind {
        StrategyKind::Adaptive => Ok(Box::new(AdaptiveAdministration::new(config, collaborators, selector)?)),
        StrategyKind::Delegated => {
            let fetcher = fetcher.ok_or(ConfigError::MissingFetcher)?;
            Ok(Box::new(DelegatedAdministration::new(
                collaborators,
                fetcher,
                config.stop_messages,
            )))
        }
    }
}
