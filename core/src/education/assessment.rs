//! # Answer Outcome Classification
//!
//! Inspects the grading state of the previously administered slot. Exactly four
//! terminal states count as "answered": graded right, graded partial, graded
//! wrong and gave up. Every other state means the question is still pending and
//! is not an error.
//!
//! Direction of the next level move depends only on the mark: `mark > 0` is the
//! sole correctness test, so partial credit with a positive mark moves up and
//! giving up (no mark) moves down.

use serde::{Deserialize, Serialize};

use crate::education::collaborators::{CollaboratorResult, Ledger};
use crate::education::model::{LedgerRef, Slot};

/// Grading state of a slot as reported by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingState {
    /// Added to the ledger but not yet started
    NotStarted,

    /// Started, awaiting a response
    Todo,

    /// Response saved, not yet submitted for grading
    Complete,

    /// Submitted, awaiting manual grading
    NeedsGrading,

    /// Fully correct
    GradedRight,

    /// Partially correct
    GradedPartial,

    /// Incorrect
    GradedWrong,

    /// Finished without a response
    GaveUp,
}

impl GradingState {
    /// Whether the state is one of the four terminal "answered" states
    pub fn is_answered(self) -> bool {
        matches!(
            self,
            GradingState::GradedRight
                | GradingState::GradedPartial
                | GradingState::GradedWrong
                | GradingState::GaveUp
        )
    }
}

/// Classification of the previous answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Unanswered,
    AnsweredCorrect,
    AnsweredIncorrect,
}

impl AnswerOutcome {
    /// Classify a grading state and its mark
    pub fn classify(state: GradingState, mark: Option<f64>) -> Self {
        if !state.is_answered() {
            return AnswerOutcome::Unanswered;
        }

        if mark.unwrap_or(0.0) > 0.0 {
            AnswerOutcome::AnsweredCorrect
        } else {
            AnswerOutcome::AnsweredIncorrect
        }
    }
}

/// Whether the question in `slot` has reached an answered state
pub fn was_answered(ledger: &dyn Ledger, ledger_ref: LedgerRef, slot: Slot) -> CollaboratorResult<bool> {
    Ok(ledger.state_of(ledger_ref, slot)?.is_answered())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [GradingState; 8] = [
        GradingState::NotStarted,
        GradingState::Todo,
        GradingState::Complete,
        GradingState::NeedsGrading,
        GradingState::GradedRight,
        GradingState::GradedPartial,
        GradingState::GradedWrong,
        GradingState::GaveUp,
    ];

    #[test]
    fn test_exactly_four_answered_states() {
        let answered: Vec<_> = ALL_STATES.iter().copied().filter(|s| s.is_answered()).collect();
        assert_eq!(
            answered,
            vec![
                GradingState::GradedRight,
                GradingState::GradedPartial,
                GradingState::GradedWrong,
                GradingState::GaveUp,
            ]
        );
    }

    #[test]
    fn test_mark_decides_direction() {
        assert_eq!(
            AnswerOutcome::classify(GradingState::GradedPartial, Some(0.5)),
            AnswerOutcome::AnsweredCorrect
        );
        assert_eq!(
            AnswerOutcome::classify(GradingState::GradedRight, Some(0.0)),
            AnswerOutcome::AnsweredIncorrect
        );
        assert_eq!(
            AnswerOutcome::classify(GradingState::GaveUp, None),
            AnswerOutcome::AnsweredIncorrect
        );
        assert_eq!(
            AnswerOutcome::classify(GradingState::NeedsGrading, Some(1.0)),
            AnswerOutcome::Unanswered
        );
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&GradingState::GradedPartial).unwrap();
        assert_eq!(json, "\"graded_partial\"");
    }
}
