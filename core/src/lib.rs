//! # Adaptive Quiz Core
//!
//! Item-selection engine for adaptive quizzes. Given an in-progress attempt it
//! decides whether another question should be administered, which difficulty
//! level to draw from, and which concrete question to present.
//!
//! ## Architecture
//!
//! * [`education::bounds`]: level range validation
//! * [`education::assessment`]: classification of the previous answer
//! * [`education::adaptive_difficulty`]: the step-based difficulty ladder
//! * [`education::pool`]: candidate questions after exclusions
//! * [`education::selector`]: uniform random pick among candidates
//! * [`education::orchestrator`]: the adaptive administration state machine
//! * [`education::evaluation`]: the minimal delegated strategy
//!
//! Persistence, grading and rendering are external collaborators described by
//! the traits in [`education::collaborators`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod education;

pub use education::adaptive_difficulty::{advance, DifficultyState};
pub use education::assessment::{was_answered, AnswerOutcome, GradingState};
pub use education::bounds::{in_bounds, LevelRange};
pub use education::collaborators::{
    AttemptStore, CollaboratorError, CollaboratorResult, Collaborators, EventSink, Ledger,
    LogEventSink, NullEventSink, QuestionCatalog, UsedQuestionsLookup,
};
pub use education::config::{ConfigError, ConfigResult, QuizConfiguration, StopMessages, StrategyKind};
pub use education::evaluation::{DelegatedAdministration, QuestionFetcher};
pub use education::memory::{InMemoryAttemptStore, InMemoryCatalog, InMemoryLedger};
pub use education::model::{AttemptId, AttemptRecord, LedgerRef, Level, QuestionDefinition, QuestionId, Slot};
pub use education::orchestrator::AdaptiveAdministration;
pub use education::pool::{PoolRequest, QuestionPool};
pub use education::selector::NextItemSelector;
pub use education::strategy::{
    build_strategy, AdministrationError, AdministrationResult, AdministrationStrategy, Decision,
    Step, StepRequest, StopKind, StopReason,
};
