//! Quiz configuration
//!
//! Read-only input to the administration strategies. Loaded from JSON by the
//! hosting runner and validated once; the configuration does not change for
//! the lifetime of an attempt.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::education::bounds::LevelRange;
use crate::education::model::Level;
use crate::education::strategy::StopKind;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Lowest level above highest level
    #[error("Invalid level range: lowest {0} is above highest {1}")]
    InvalidLevelRange(Level, Level),

    /// A quiz must allow at least one question
    #[error("Maximum questions must be at least 1")]
    ZeroMaximumQuestions,

    /// The delegated strategy was configured without a fetcher
    #[error("Delegated strategy requires a question fetcher")]
    MissingFetcher,

    /// Malformed configuration document
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for configuration results
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Administration strategy selected for a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Difficulty ladder with pool exclusion
    #[default]
    Adaptive,

    /// Delegates question choice to an external fetcher
    Delegated,
}

/// Human-readable stop criterion texts, overridable for localization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopMessages {
    pub level_out_of_bounds: String,
    pub max_questions_attempted: String,
    pub fetch_failed: String,
    pub attempt_state_error: String,
}

impl StopMessages {
    /// Message for a stop kind
    ///
    /// Delegated stops carry their own text; this is the fallback when the
    /// delegate supplies none.
    pub fn message_for(&self, kind: StopKind) -> &str {
        match kind {
            StopKind::LevelOutOfBounds => self.level_out_of_bounds.as_str(),
            StopKind::MaxQuestionsAttempted => self.max_questions_attempted.as_str(),
            StopKind::FetchFailed | StopKind::Delegated => self.fetch_failed.as_str(),
            StopKind::AttemptStateError => self.attempt_state_error.as_str(),
        }
    }
}

impl Default for StopMessages {
    fn default() -> Self {
        Self {
            level_out_of_bounds: "level out of bounds".to_string(),
            max_questions_attempted: "max questions attempted".to_string(),
            fetch_failed: "error fetching question".to_string(),
            attempt_state_error: "attempt state error".to_string(),
        }
    }
}

/// Adaptive quiz configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfiguration {
    /// Lowest difficulty level
    pub lowest_level: Level,

    /// Highest difficulty level
    pub highest_level: Level,

    /// Level of the first question of an attempt
    pub starting_level: Level,

    /// Questions after which the attempt stops
    pub maximum_questions: u32,

    /// Administration strategy
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Stop criterion texts
    #[serde(default)]
    pub stop_messages: StopMessages,
}

impl QuizConfiguration {
    /// Adaptive configuration with default messages
    pub fn new(lowest_level: Level, highest_level: Level, starting_level: Level, maximum_questions: u32) -> Self {
        Self {
            lowest_level,
            highest_level,
            starting_level,
            maximum_questions,
            strategy: StrategyKind::default(),
            stop_messages: StopMessages::default(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check structural consistency
    ///
    /// The starting level is deliberately not checked here: an out-of-range
    /// starting level is reported as a stop criterion at run time.
    pub fn validate(&self) -> ConfigResult<()> {
        self.level_range()?;

        if self.maximum_questions == 0 {
            return Err(ConfigError::ZeroMaximumQuestions);
        }

        Ok(())
    }

    /// The `[lowest, highest]` range
    pub fn level_range(&self) -> ConfigResult<LevelRange> {
        LevelRange::new(self.lowest_level, self.highest_level)
            .ok_or(ConfigError::InvalidLevelRange(self.lowest_level, self.highest_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let config = QuizConfiguration::from_json_str(
            r#"{"lowest_level": 1, "highest_level": 10, "starting_level": 3, "maximum_questions": 20}"#,
        )
        .unwrap();

        assert_eq!(config.strategy, StrategyKind::Adaptive);
        assert_eq!(config.stop_messages, StopMessages::default());
        assert_eq!(config.level_range().unwrap(), LevelRange::new(1, 10).unwrap());
    }

    #[test]
    fn test_parse_overrides() {
        let config = QuizConfiguration::from_json_str(
            r#"{
                "lowest_level": 1,
                "highest_level": 5,
                "starting_level": 2,
                "maximum_questions": 4,
                "strategy": "delegated",
                "stop_messages": {"fetch_failed": "plus de questions"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.strategy, StrategyKind::Delegated);
        assert_eq!(config.stop_messages.message_for(StopKind::FetchFailed), "plus de questions");
        assert_eq!(
            config.stop_messages.message_for(StopKind::MaxQuestionsAttempted),
            "max questions attempted"
        );
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = QuizConfiguration::new(10, 1, 5, 20).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLevelRange(10, 1)));
    }

    #[test]
    fn test_rejects_zero_maximum() {
        let err = QuizConfiguration::new(1, 10, 5, 0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroMaximumQuestions));
    }

    #[test]
    fn test_out_of_range_starting_level_is_valid_config() {
        assert!(QuizConfiguration::new(1, 10, 42, 20).validate().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            QuizConfiguration::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            QuizConfiguration::from_path("/nonexistent/adaptive-quiz.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
