//! Data model shared by the administration pipeline
//!
//! Identifiers are plain integers so hosts can map them directly onto their
//! storage keys. A [`Slot`] is never zero: the "no question pending" case is
//! expressed as `Option<Slot>::None` rather than a sentinel value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Attempt identifier assigned by the hosting quiz runner
pub type AttemptId = u64;

/// Question identifier within the question catalog
pub type QuestionId = u64;

/// Integer difficulty rating bounded by the quiz configuration
pub type Level = i32;

/// Handle to one administered question instance within a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Slot(u32);

impl Slot {
    /// Create a slot handle, rejecting the zero sentinel
    pub fn new(index: u32) -> Option<Self> {
        (index != 0).then_some(Self(index))
    }

    /// Raw slot number, always at least one
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Slot {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Slot::new(value).ok_or_else(|| "slot number must be non-zero".to_string())
    }
}

impl From<Slot> for u32 {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot #{}", self.0)
    }
}

/// Reference to the question-usage ledger backing an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LedgerRef(pub u64);

impl fmt::Display for LedgerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ledger {}", self.0)
    }
}

/// Attempt state as persisted by the attempt store between steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Attempt identifier
    pub attempt_id: AttemptId,

    /// Number of questions the student has answered so far
    pub questions_attempted: u32,

    /// Ledger holding the administered questions, absent until the first one
    pub ledger_ref: Option<LedgerRef>,
}

impl AttemptRecord {
    /// A brand new attempt with no questions and no ledger
    pub fn fresh(attempt_id: AttemptId) -> Self {
        Self {
            attempt_id,
            questions_attempted: 0,
            ledger_ref: None,
        }
    }
}

/// Question definition as loaded from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    /// Catalog identifier
    pub id: QuestionId,

    /// Display name
    pub name: String,

    /// Difficulty level the question is tagged with
    pub level: Level,
}
