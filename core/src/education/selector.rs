//! Uniform random selection among candidate questions

use std::collections::BTreeSet;

use rand::seq::IteratorRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::education::model::QuestionId;
use crate::education::strategy::{AdministrationError, AdministrationResult};

/// Picks the next question uniformly at random
#[derive(Debug, Clone)]
pub struct NextItemSelector {
    rng: ChaCha20Rng,
}

impl NextItemSelector {
    /// Reproducible selector for simulations and tests
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Selector seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Pick one candidate
    ///
    /// An empty candidate set is a caller error: exhaustion must be handled
    /// before selection.
    pub fn pick(&mut self, candidates: &BTreeSet<QuestionId>) -> AdministrationResult<QuestionId> {
        candidates
            .iter()
            .copied()
            .choose(&mut self.rng)
            .ok_or(AdministrationError::EmptyCandidates)
    }
}

impl Default for NextItemSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}
