//! Trial harness - many independent duels under one configuration
//!
//! Level 1 - Orchestration and Level 2 - Phases

use knightduel_core::{DuelOutcome, Knight, Result};
use serde::Serialize;

use crate::config::ExperimentConfig;
use crate::duel_runner::DuelRunner;
use crate::stats::TrialStats;

/// Result of an experiment run
#[derive(Clone, Debug, Serialize)]
pub struct TrialReport {
    /// Configuration the run used
    pub config: ExperimentConfig,
    pub knight1: String,
    pub knight2: String,
    pub stats: TrialStats,
}

impl TrialReport {
    pub fn knight1_avg(&self) -> f64 {
        self.stats.avg_moves(Knight::First)
    }

    pub fn knight2_avg(&self) -> f64 {
        self.stats.avg_moves(Knight::Second)
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run every trial of `config` (Level 1 orchestration)
pub fn run_trials(config: &ExperimentConfig) -> Result<TrialReport> {
    run_trials_with_callback(config, |_, _, _| {})
}

/// Run every trial, calling `on_trial(done, total, outcome)` after each
pub fn run_trials_with_callback<F>(config: &ExperimentConfig, mut on_trial: F) -> Result<TrialReport>
where
    F: FnMut(u32, u32, &DuelOutcome),
{
    let mut runner = DuelRunner::new(config)?;
    tracing::info!(
        "Starting {} trials: {} vs {} on {}x{} ({}, {}, tie-break {})",
        config.trials,
        config.knight1,
        config.knight2,
        config.board_size,
        config.board_size,
        config.turn_model,
        config.crossing_rule,
        config.tie_break,
    );

    let stats = run_batch(&mut runner, config.trials, &mut on_trial)?;

    tracing::info!(
        "Finished: knight 1 avg {:.2}, knight 2 avg {:.2}, draws {:.1}%",
        stats.avg_moves(Knight::First),
        stats.avg_moves(Knight::Second),
        stats.draw_rate() * 100.0,
    );

    Ok(TrialReport {
        config: config.clone(),
        knight1: config.knight1.name(),
        knight2: config.knight2.name(),
        stats,
    })
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Play `trials` duels with an existing runner (Level 2 phase)
pub fn run_batch<F>(runner: &mut DuelRunner, trials: u32, on_trial: &mut F) -> Result<TrialStats>
where
    F: FnMut(u32, u32, &DuelOutcome),
{
    let mut stats = TrialStats::new();
    for trial in 0..trials {
        let outcome = runner.play_duel()?;
        tracing::debug!(
            "Trial {}: {} from {} vs {} from {} -> {:?}",
            trial + 1,
            outcome.moves[0],
            outcome.paths[0][0],
            outcome.moves[1],
            outcome.paths[1][0],
            outcome.result,
        );
        stats.record(&outcome);
        on_trial(trial + 1, trials, &outcome);
    }
    Ok(stats)
}
