//! Adaptive item administration components
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod adaptive_difficulty;
pub mod assessment;
pub mod bounds;
pub mod collaborators;
pub mod config;
pub mod evaluation;
pub mod memory;
pub mod model;
pub mod orchestrator;
pub mod pool;
pub mod selector;
pub mod strategy;
