//! External collaborator contracts
//!
//! The engine owns no storage. Attempts, ledgers, the question catalog and the
//! event log are reached through the traits below, injected once at
//! construction through [`Collaborators`]. Implementations are expected to
//! serialize concurrent steps for the same attempt (row lock or version check
//! around the read-pending-slot / write-new-slot sequence) and to provide
//! read-your-writes consistency within a step.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::education::assessment::GradingState;
use crate::education::bounds::LevelRange;
use crate::education::model::{AttemptId, AttemptRecord, LedgerRef, Level, QuestionDefinition, QuestionId, Slot};

/// Collaborator failure types, propagated to the caller untouched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// Attempt is unknown to the attempt store
    #[error("Attempt not found: {0}")]
    AttemptNotFound(AttemptId),

    /// Ledger reference does not resolve
    #[error("Ledger not found: {0}")]
    LedgerNotFound(LedgerRef),

    /// Slot is not part of the ledger
    #[error("Slot not found in {0}: {1}")]
    SlotNotFound(LedgerRef, Slot),

    /// Question is unknown to the catalog
    #[error("Question not found: {0}")]
    QuestionNotFound(QuestionId),

    /// Backend storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Type alias for collaborator results
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Persistence of attempt records between administration steps
pub trait AttemptStore: Send + Sync {
    /// Read the current attempt record
    fn read(&self, attempt_id: AttemptId) -> CollaboratorResult<AttemptRecord>;

    /// Attach a newly created ledger to the attempt
    fn set_ledger_ref(&self, attempt_id: AttemptId, ledger_ref: LedgerRef) -> CollaboratorResult<()>;
}

/// Per-attempt question-usage ledger
pub trait Ledger: Send + Sync {
    /// Create an empty ledger for an attempt
    fn create(&self, attempt_id: AttemptId) -> CollaboratorResult<LedgerRef>;

    /// Slots in administration order
    fn slots(&self, ledger: LedgerRef) -> CollaboratorResult<Vec<Slot>>;

    /// Grading state of a slot
    fn state_of(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<GradingState>;

    /// Mark awarded for a slot, `None` while ungraded
    fn mark_of(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<Option<f64>>;

    /// Question administered in a slot
    fn question_of(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<QuestionId>;

    /// Append a question, allocating a fresh slot
    fn add_question(&self, ledger: LedgerRef, question: &QuestionDefinition) -> CollaboratorResult<Slot>;

    /// Start the question in a slot
    fn start(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<()>;

    /// Persist pending ledger changes
    fn save(&self, ledger: LedgerRef) -> CollaboratorResult<()>;
}

/// Source of question definitions tagged with difficulty levels
pub trait QuestionCatalog: Send + Sync {
    /// Questions tagged with `level` that are not in `exclude`
    fn questions_at_level(
        &self,
        level: Level,
        exclude: &BTreeSet<QuestionId>,
    ) -> CollaboratorResult<BTreeSet<QuestionId>>;

    /// Levels inside `window` that still hold a question not in `exclude`
    ///
    /// Answered in one query so the cost does not grow with the width of the
    /// configured level range.
    fn levels_with_questions(
        &self,
        window: LevelRange,
        exclude: &BTreeSet<QuestionId>,
    ) -> CollaboratorResult<BTreeSet<Level>>;

    /// Load a question definition
    fn load(&self, question: QuestionId) -> CollaboratorResult<QuestionDefinition>;
}

/// Lookup of the questions already used by an attempt
///
/// Keyed by the attempt's ledger reference, which is its unique usage id:
/// every attempt owns exactly one ledger and a ledger belongs to exactly one
/// attempt.
pub trait UsedQuestionsLookup: Send + Sync {
    /// Question ids in administration order (ascending slot)
    fn used_ids(&self, ledger: LedgerRef) -> CollaboratorResult<Vec<QuestionId>>;
}

/// Fire-and-forget diagnostic event log
///
/// Recording never fails from the caller's point of view and never influences
/// the administration decision.
pub trait EventSink: Send + Sync {
    fn record(&self, attempt_id: AttemptId, message: &str);
}

/// Event sink writing to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn record(&self, attempt_id: AttemptId, message: &str) {
        info!(target: "adaptive_quiz::events", "attempt {}: {}", attempt_id, message);
    }
}

/// Event sink discarding every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn record(&self, _attempt_id: AttemptId, _message: &str) {}
}

/// Bundle of injected collaborators shared by the administration strategies
#[derive(Clone)]
pub struct Collaborators {
    /// Attempt persistence
    pub attempts: Arc<dyn AttemptStore>,

    /// Question-usage ledger
    pub ledger: Arc<dyn Ledger>,

    /// Question catalog
    pub catalog: Arc<dyn QuestionCatalog>,

    /// Used question lookup
    pub used: Arc<dyn UsedQuestionsLookup>,

    /// Diagnostic events
    pub events: Arc<dyn EventSink>,
}

impl Collaborators {
    /// Last slot of the attempt's ledger, if the attempt has one
    pub fn pending_slot(&self, record: &AttemptRecord) -> CollaboratorResult<Option<(LedgerRef, Slot)>> {
        let Some(ledger_ref) = record.ledger_ref else {
            return Ok(None);
        };

        let slots = self.ledger.slots(ledger_ref)?;
        Ok(slots.last().map(|slot| (ledger_ref, *slot)))
    }

    /// Question ids already administered in the attempt
    pub fn excluded_questions(&self, record: &AttemptRecord) -> CollaboratorResult<BTreeSet<QuestionId>> {
        match record.ledger_ref {
            Some(ledger_ref) => Ok(self.used.used_ids(ledger_ref)?.into_iter().collect()),
            None => Ok(BTreeSet::new()),
        }
    }

    /// Attach a question to a new slot, start it and save the ledger
    ///
    /// Creates the attempt's ledger first when it has none yet.
    pub fn administer(&self, record: &AttemptRecord, question: QuestionId) -> CollaboratorResult<Slot> {
        let ledger_ref = match record.ledger_ref {
            Some(ledger_ref) => ledger_ref,
            None => {
                let ledger_ref = self.ledger.create(record.attempt_id)?;
                self.attempts.set_ledger_ref(record.attempt_id, ledger_ref)?;
                debug!("Created {} for attempt {}", ledger_ref, record.attempt_id);
                ledger_ref
            }
        };

        let definition = self.catalog.load(question)?;
        let slot = self.ledger.add_question(ledger_ref, &definition)?;
        self.ledger.start(ledger_ref, slot)?;
        self.ledger.save(ledger_ref)?;

        Ok(slot)
    }
}
