//! KNIGHTDUEL Tournament - Strategy comparison through repeated duels
//!
//! This crate provides experiment infrastructure:
//! - Experiment configuration and validation
//! - The trial harness and its statistics
//! - Heuristic surveys against a fixed baseline
//! - The mirror-blockade experiment
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_trials, run_survey, run_blockades (orchestration)
//! - Level 2: run_batch (phases)
//! - Level 3: DuelRunner::play_duel, play_blockade (steps)
//! - Level 4: statistics, configuration

mod blockade;
mod config;
mod duel_runner;
mod stats;
mod survey;
mod trials;

pub use blockade::{play_blockade, run_blockades, BlockadeReport, BlockadeScript};
pub use config::{BlockadeConfig, ExperimentConfig, MIN_BOARD_SIZE};
pub use duel_runner::{create_rng, DuelRunner};
pub use stats::{CategoryTotals, LengthBucket, TrialStats};
pub use survey::{default_challengers, run_survey, run_survey_with_callback, SurveyResult, SurveyRow};
pub use trials::{run_batch, run_trials, run_trials_with_callback, TrialReport};
