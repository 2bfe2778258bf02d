//! In-memory collaborators
//!
//! Thread-safe implementations of the storage contracts for simulations,
//! demos and tests. The ledger counts every call made through its traits so
//! callers can assert that a step never touched it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::education::assessment::GradingState;
use crate::education::bounds::LevelRange;
use crate::education::collaborators::{
    AttemptStore, CollaboratorError, CollaboratorResult, Ledger, QuestionCatalog, UsedQuestionsLookup,
};
use crate::education::model::{AttemptId, AttemptRecord, LedgerRef, Level, QuestionDefinition, QuestionId, Slot};

fn poisoned<T>(_: PoisonError<T>) -> CollaboratorError {
    CollaboratorError::Storage("in-memory store lock poisoned".to_string())
}

/// Attempt records keyed by attempt id
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    records: RwLock<HashMap<AttemptId, AttemptRecord>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub fn insert(&self, record: AttemptRecord) -> CollaboratorResult<()> {
        self.records
            .write()
            .map_err(poisoned)?
            .insert(record.attempt_id, record);
        Ok(())
    }

    /// Count one more answered question for the attempt
    pub fn record_attempted(&self, attempt_id: AttemptId) -> CollaboratorResult<u32> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .get_mut(&attempt_id)
            .ok_or(CollaboratorError::AttemptNotFound(attempt_id))?;
        record.questions_attempted += 1;
        Ok(record.questions_attempted)
    }
}

impl AttemptStore for InMemoryAttemptStore {
    fn read(&self, attempt_id: AttemptId) -> CollaboratorResult<AttemptRecord> {
        self.records
            .read()
            .map_err(poisoned)?
            .get(&attempt_id)
            .cloned()
            .ok_or(CollaboratorError::AttemptNotFound(attempt_id))
    }

    fn set_ledger_ref(&self, attempt_id: AttemptId, ledger_ref: LedgerRef) -> CollaboratorResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .get_mut(&attempt_id)
            .ok_or(CollaboratorError::AttemptNotFound(attempt_id))?;
        record.ledger_ref = Some(ledger_ref);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SlotEntry {
    question: QuestionId,
    state: GradingState,
    mark: Option<f64>,
}

#[derive(Debug, Default)]
struct LedgerEntries {
    slots: Vec<SlotEntry>,
    saves: usize,
}

impl LedgerEntries {
    fn entry(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<&SlotEntry> {
        self.slots
            .get(slot.get() as usize - 1)
            .ok_or(CollaboratorError::SlotNotFound(ledger, slot))
    }

    fn entry_mut(&mut self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<&mut SlotEntry> {
        self.slots
            .get_mut(slot.get() as usize - 1)
            .ok_or(CollaboratorError::SlotNotFound(ledger, slot))
    }
}

/// Question-usage ledgers; slots are numbered from one in administration order
#[derive(Debug)]
pub struct InMemoryLedger {
    ledgers: RwLock<HashMap<LedgerRef, LedgerEntries>>,
    next_ref: AtomicU64,
    accesses: AtomicUsize,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self {
            ledgers: RwLock::new(HashMap::new()),
            next_ref: AtomicU64::new(1),
            accesses: AtomicUsize::new(0),
        }
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made through the `Ledger` and `UsedQuestionsLookup` traits
    pub fn access_count(&self) -> usize {
        self.accesses.load(Ordering::Relaxed)
    }

    /// Number of saves performed on a ledger
    pub fn save_count(&self, ledger: LedgerRef) -> CollaboratorResult<usize> {
        let ledgers = self.ledgers.read().map_err(poisoned)?;
        Ok(ledgers.get(&ledger).ok_or(CollaboratorError::LedgerNotFound(ledger))?.saves)
    }

    /// Record the grading outcome of a slot
    pub fn grade(&self, ledger: LedgerRef, slot: Slot, state: GradingState, mark: Option<f64>) -> CollaboratorResult<()> {
        self.with_entries_mut(ledger, |entries| {
            let entry = entries.entry_mut(ledger, slot)?;
            entry.state = state;
            entry.mark = mark;
            Ok(())
        })
    }

    fn touch(&self) {
        self.accesses.fetch_add(1, Ordering::Relaxed);
    }

    fn with_entries<T>(
        &self,
        ledger: LedgerRef,
        f: impl FnOnce(&LedgerEntries) -> CollaboratorResult<T>,
    ) -> CollaboratorResult<T> {
        let ledgers = self.ledgers.read().map_err(poisoned)?;
        f(ledgers.get(&ledger).ok_or(CollaboratorError::LedgerNotFound(ledger))?)
    }

    fn with_entries_mut<T>(
        &self,
        ledger: LedgerRef,
        f: impl FnOnce(&mut LedgerEntries) -> CollaboratorResult<T>,
    ) -> CollaboratorResult<T> {
        let mut ledgers = self.ledgers.write().map_err(poisoned)?;
        f(ledgers.get_mut(&ledger).ok_or(CollaboratorError::LedgerNotFound(ledger))?)
    }
}

impl Ledger for InMemoryLedger {
    fn create(&self, _attempt_id: AttemptId) -> CollaboratorResult<LedgerRef> {
        self.touch();
        let ledger = LedgerRef(self.next_ref.fetch_add(1, Ordering::Relaxed));
        self.ledgers
            .write()
            .map_err(poisoned)?
            .insert(ledger, LedgerEntries::default());
        Ok(ledger)
    }

    fn slots(&self, ledger: LedgerRef) -> CollaboratorResult<Vec<Slot>> {
        self.touch();
        self.with_entries(ledger, |entries| {
            Ok((1..=entries.slots.len() as u32).filter_map(Slot::new).collect())
        })
    }

    fn state_of(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<GradingState> {
        self.touch();
        self.with_entries(ledger, |entries| Ok(entries.entry(ledger, slot)?.state))
    }

    fn mark_of(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<Option<f64>> {
        self.touch();
        self.with_entries(ledger, |entries| Ok(entries.entry(ledger, slot)?.mark))
    }

    fn question_of(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<QuestionId> {
        self.touch();
        self.with_entries(ledger, |entries| Ok(entries.entry(ledger, slot)?.question))
    }

    fn add_question(&self, ledger: LedgerRef, question: &QuestionDefinition) -> CollaboratorResult<Slot> {
        self.touch();
        self.with_entries_mut(ledger, |entries| {
            entries.slots.push(SlotEntry {
                question: question.id,
                state: GradingState::NotStarted,
                mark: None,
            });
            Slot::new(entries.slots.len() as u32)
                .ok_or_else(|| CollaboratorError::Storage("slot numbering overflow".to_string()))
        })
    }

    fn start(&self, ledger: LedgerRef, slot: Slot) -> CollaboratorResult<()> {
        self.touch();
        self.with_entries_mut(ledger, |entries| {
            entries.entry_mut(ledger, slot)?.state = GradingState::Todo;
            Ok(())
        })
    }

    fn save(&self, ledger: LedgerRef) -> CollaboratorResult<()> {
        self.touch();
        self.with_entries_mut(ledger, |entries| {
            entries.saves += 1;
            Ok(())
        })
    }
}

impl UsedQuestionsLookup for InMemoryLedger {
    fn used_ids(&self, ledger: LedgerRef) -> CollaboratorResult<Vec<QuestionId>> {
        self.touch();
        self.with_entries(ledger, |entries| {
            Ok(entries.slots.iter().map(|entry| entry.question).collect())
        })
    }
}

/// Fixed catalog of leveled questions
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    questions: BTreeMap<QuestionId, QuestionDefinition>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with_question(mut self, id: QuestionId, name: &str, level: Level) -> Self {
        self.insert(QuestionDefinition {
            id,
            name: name.to_string(),
            level,
        });
        self
    }

    pub fn insert(&mut self, question: QuestionDefinition) {
        self.questions.insert(question.id, question);
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionCatalog for InMemoryCatalog {
    fn questions_at_level(
        &self,
        level: Level,
        exclude: &BTreeSet<QuestionId>,
    ) -> CollaboratorResult<BTreeSet<QuestionId>> {
        Ok(self
            .questions
            .values()
            .filter(|question| question.level == level && !exclude.contains(&question.id))
            .map(|question| question.id)
            .collect())
    }

    fn levels_with_questions(
        &self,
        window: LevelRange,
        exclude: &BTreeSet<QuestionId>,
    ) -> CollaboratorResult<BTreeSet<Level>> {
        Ok(self
            .questions
            .values()
            .filter(|question| window.contains(question.level) && !exclude.contains(&question.id))
            .map(|question| question.level)
            .collect())
    }

    fn load(&self, question: QuestionId) -> CollaboratorResult<QuestionDefinition> {
        self.questions
            .get(&question)
            .cloned()
            .ok_or(CollaboratorError::QuestionNotFound(question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::education::assessment::was_answered;

    #[test]
    fn test_ledger_allocates_fresh_slots() {
        let ledger = InMemoryLedger::new();
        let r = ledger.create(1).unwrap();
        let question = QuestionDefinition {
            id: 9,
            name: "q9".to_string(),
            level: 2,
        };

        let first = ledger.add_question(r, &question).unwrap();
        let second = ledger.add_question(r, &question).unwrap();

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
        assert_eq!(ledger.slots(r).unwrap(), vec![first, second]);
        assert_eq!(ledger.state_of(r, first).unwrap(), GradingState::NotStarted);
    }

    #[test]
    fn test_grading_makes_slot_answered() {
        let ledger = InMemoryLedger::new();
        let r = ledger.create(1).unwrap();
        let slot = ledger
            .add_question(r, &QuestionDefinition { id: 1, name: "q".to_string(), level: 1 })
            .unwrap();
        ledger.start(r, slot).unwrap();

        assert!(!was_answered(&ledger, r, slot).unwrap());
        ledger.grade(r, slot, GradingState::GradedPartial, Some(0.4)).unwrap();
        assert!(was_answered(&ledger, r, slot).unwrap());
        assert_eq!(ledger.mark_of(r, slot).unwrap(), Some(0.4));
    }

    #[test]
    fn test_unknown_slot_and_ledger() {
        let ledger = InMemoryLedger::new();
        let r = ledger.create(1).unwrap();
        let slot = Slot::new(3).unwrap();

        assert_eq!(ledger.state_of(r, slot), Err(CollaboratorError::SlotNotFound(r, slot)));
        assert_eq!(
            ledger.slots(LedgerRef(77)),
            Err(CollaboratorError::LedgerNotFound(LedgerRef(77)))
        );
    }

    #[test]
    fn test_used_ids_follow_administration_order() {
        let ledger = InMemoryLedger::new();
        let r = ledger.create(1).unwrap();
        for id in [30, 10, 20] {
            ledger
                .add_question(r, &QuestionDefinition { id, name: String::new(), level: 1 })
                .unwrap();
        }

        assert_eq!(ledger.used_ids(r).unwrap(), vec![30, 10, 20]);
    }

    #[test]
    fn test_attempt_store_round_trip() {
        let store = InMemoryAttemptStore::new();
        store.insert(AttemptRecord::fresh(4)).unwrap();
        store.set_ledger_ref(4, LedgerRef(2)).unwrap();
        assert_eq!(store.record_attempted(4).unwrap(), 1);

        let record = store.read(4).unwrap();
        assert_eq!(record.ledger_ref, Some(LedgerRef(2)));
        assert_eq!(record.questions_attempted, 1);
        assert_eq!(store.read(5), Err(CollaboratorError::AttemptNotFound(5)));
    }

    #[test]
    fn test_catalog_filters_level_and_exclusions() {
        let catalog = InMemoryCatalog::new()
            .with_question(1, "a", 1)
            .with_question(2, "b", 1)
            .with_question(3, "c", 2);

        let exclude = BTreeSet::from([2]);
        assert_eq!(catalog.questions_at_level(1, &exclude).unwrap(), BTreeSet::from([1]));
        assert_eq!(
            catalog.levels_with_questions(LevelRange::new(1, 5).unwrap(), &BTreeSet::from([3])).unwrap(),
            BTreeSet::from([1])
        );
        assert_eq!(catalog.load(3).unwrap().level, 2);
        assert_eq!(catalog.load(4), Err(CollaboratorError::QuestionNotFound(4)));
    }
}
