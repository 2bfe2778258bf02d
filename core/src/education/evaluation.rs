//! Delegated administration
//!
//! Minimal strategy that leaves question choice to an external fetcher. No
//! difficulty adjustment and no exclusion logic: a zero id from the fetcher
//! stops the attempt with the fetcher's message, any other id is attached to
//! a new ledger slot. While the previous question is unanswered it stays the
//! pending one and the fetcher is not consulted.

use log::debug;

use crate::education::assessment::was_answered;
use crate::education::collaborators::Collaborators;
use crate::education::config::StopMessages;
use crate::education::model::{AttemptRecord, QuestionId, Slot};
use crate::education::strategy::{
    AdministrationResult, AdministrationStrategy, Decision, Step, StepRequest, StopKind, StopReason,
};

/// External source of the next question id
///
/// Returns the question id and an error message; id `0` means nothing could
/// be fetched and the message explains why. An empty message is replaced by
/// the configured "fetch failed" text of [`StopMessages`].
pub trait QuestionFetcher: Send {
    fn fetch_next(&mut self, attempt: &AttemptRecord, previous_slot: Option<Slot>) -> (QuestionId, String);
}

impl<F> QuestionFetcher for F
where
    F: FnMut(&AttemptRecord, Option<Slot>) -> (QuestionId, String) + Send,
{
    fn fetch_next(&mut self, attempt: &AttemptRecord, previous_slot: Option<Slot>) -> (QuestionId, String) {
        self(attempt, previous_slot)
    }
}

/// Strategy delegating question choice to a [`QuestionFetcher`]
pub struct DelegatedAdministration {
    collaborators: Collaborators,
    fetcher: Box<dyn QuestionFetcher>,
    messages: StopMessages,
}

impl DelegatedAdministration {
    pub fn new(collaborators: Collaborators, fetcher: Box<dyn QuestionFetcher>, messages: StopMessages) -> Self {
        Self {
            collaborators,
            fetcher,
            messages,
        }
    }
}

impl AdministrationStrategy for DelegatedAdministration {
    fn evaluate(&mut self, request: &StepRequest) -> AdministrationResult<Step> {
        let record = self.collaborators.attempts.read(request.attempt_id)?;
        let pending = self.collaborators.pending_slot(&record)?;

        if let Some((ledger_ref, slot)) = pending {
            if !was_answered(self.collaborators.ledger.as_ref(), ledger_ref, slot)? {
                debug!("Attempt {}: {} still pending", record.attempt_id, slot);
                return Ok(Step {
                    decision: Decision::Ready { slot },
                    difficulty: request.difficulty,
                });
            }
        }

        let previous_slot = pending.map(|(_, slot)| slot);
        let (question, message) = self.fetcher.fetch_next(&record, previous_slot);

        if question == 0 {
            let message = if message.is_empty() {
                self.messages.message_for(StopKind::Delegated).to_string()
            } else {
                message
            };
            debug!("Attempt {} stopped by fetcher: {}", record.attempt_id, message);
            self.collaborators.events.record(record.attempt_id, &message);

            return Ok(Step {
                decision: Decision::Stopped {
                    reason: StopReason {
                        kind: StopKind::Delegated,
                        message,
                    },
                },
                difficulty: request.difficulty,
            });
        }

        let slot = self.collaborators.administer(&record, question)?;
        self.collaborators
            .events
            .record(record.attempt_id, &format!("question {} administered", question));

        Ok(Step {
            decision: Decision::Ready { slot },
            difficulty: request.difficulty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::education::adaptive_difficulty::DifficultyState;
    use crate::education::assessment::GradingState;
    use crate::education::collaborators::{AttemptStore, CollaboratorError, Ledger, NullEventSink, UsedQuestionsLookup};
    use crate::education::memory::{InMemoryAttemptStore, InMemoryCatalog, InMemoryLedger};
    use crate::education::strategy::AdministrationError;

    struct Fixture {
        attempts: Arc<InMemoryAttemptStore>,
        ledger: Arc<InMemoryLedger>,
        collaborators: Collaborators,
    }

    fn fixture() -> Fixture {
        let attempts = Arc::new(InMemoryAttemptStore::new());
        attempts.insert(AttemptRecord::fresh(1)).unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        let catalog = InMemoryCatalog::new()
            .with_question(11, "first", 1)
            .with_question(12, "second", 9);

        let collaborators = Collaborators {
            attempts: attempts.clone(),
            ledger: ledger.clone(),
            catalog: Arc::new(catalog),
            used: ledger.clone(),
            events: Arc::new(NullEventSink),
        };

        Fixture {
            attempts,
            ledger,
            collaborators,
        }
    }

    fn request() -> StepRequest {
        StepRequest {
            attempt_id: 1,
            difficulty: DifficultyState::at_level(4),
        }
    }

    #[test]
    fn test_zero_id_stops_with_fetcher_message() {
        let f = fixture();
        let fetcher = |_: &AttemptRecord, _: Option<Slot>| -> (QuestionId, String) { (0, "no more items".to_string()) };
        let mut strategy = DelegatedAdministration::new(f.collaborators, Box::new(fetcher), StopMessages::default());

        let step = strategy.evaluate(&request()).unwrap();

        let reason = step.decision.stop_reason().unwrap();
        assert_eq!(reason.kind, StopKind::Delegated);
        assert_eq!(reason.message, "no more items");
        assert_eq!(step.difficulty, request().difficulty);
    }

    #[test]
    fn test_zero_id_without_message_uses_default() {
        let f = fixture();
        let fetcher = |_: &AttemptRecord, _: Option<Slot>| -> (QuestionId, String) { (0, String::new()) };
        let mut strategy = DelegatedAdministration::new(f.collaborators, Box::new(fetcher), StopMessages::default());

        let step = strategy.evaluate(&request()).unwrap();
        assert_eq!(step.decision.stop_reason().unwrap().message, "error fetching question");
    }

    #[test]
    fn test_fetched_id_becomes_new_slot() {
        let f = fixture();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_fetcher = seen.clone();
        let mut queue = vec![12, 11];
        let fetcher = move |_: &AttemptRecord, previous: Option<Slot>| -> (QuestionId, String) {
            seen_by_fetcher.lock().unwrap().push(previous);
            (queue.pop().unwrap_or(0), "exhausted".to_string())
        };
        let mut strategy = DelegatedAdministration::new(f.collaborators, Box::new(fetcher), StopMessages::default());

        let first = strategy.evaluate(&request()).unwrap().decision.slot().unwrap();
        let ledger_ref = f.attempts.read(1).unwrap().ledger_ref.unwrap();
        f.ledger.grade(ledger_ref, first, GradingState::GradedRight, Some(1.0)).unwrap();

        let second = strategy.evaluate(&request()).unwrap().decision.slot().unwrap();
        f.ledger.grade(ledger_ref, second, GradingState::GradedWrong, Some(0.0)).unwrap();

        let third = strategy.evaluate(&request()).unwrap();

        assert_eq!(f.ledger.question_of(ledger_ref, first).unwrap(), 11);
        assert_eq!(f.ledger.question_of(ledger_ref, second).unwrap(), 12);
        assert_eq!(third.decision.stop_reason().unwrap().message, "exhausted");
        assert_eq!(*seen.lock().unwrap(), vec![None, Some(first), Some(second)]);
    }

    #[test]
    fn test_unanswered_slot_is_returned_again() {
        let f = fixture();
        let calls = Arc::new(Mutex::new(0));
        let calls_by_fetcher = calls.clone();
        let fetcher = move |_: &AttemptRecord, _: Option<Slot>| -> (QuestionId, String) {
            *calls_by_fetcher.lock().unwrap() += 1;
            (11, String::new())
        };
        let mut strategy = DelegatedAdministration::new(f.collaborators, Box::new(fetcher), StopMessages::default());

        let first = strategy.evaluate(&request()).unwrap();
        let second = strategy.evaluate(&request()).unwrap();

        let ledger_ref = f.attempts.read(1).unwrap().ledger_ref.unwrap();
        assert_eq!(first.decision, second.decision);
        assert_eq!(f.ledger.slots(ledger_ref).unwrap().len(), 1);
        assert_eq!(f.ledger.used_ids(ledger_ref).unwrap(), vec![11]);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_unknown_question_propagates() {
        let f = fixture();
        let fetcher = |_: &AttemptRecord, _: Option<Slot>| -> (QuestionId, String) { (99, String::new()) };
        let mut strategy = DelegatedAdministration::new(f.collaborators, Box::new(fetcher), StopMessages::default());

        assert!(matches!(
            strategy.evaluate(&request()),
            Err(AdministrationError::Collaborator(CollaboratorError::QuestionNotFound(99)))
        ));
    }
}
