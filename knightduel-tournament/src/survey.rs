//! Heuristic survey - every challenger against one baseline
//!
//! Level 1 - Orchestration and Level 2 - Phases

use knightduel_core::{DuelOutcome, Heuristic, Knight, MetaHeuristic, Policy, Result};
use serde::Serialize;

use crate::config::ExperimentConfig;
use crate::duel_runner::DuelRunner;
use crate::stats::TrialStats;
use crate::trials::run_batch;

/// One challenger's batch
#[derive(Clone, Debug, Serialize)]
pub struct SurveyRow {
    /// Index into the challenger list
    pub index: usize,
    pub name: String,
    pub stats: TrialStats,
}

impl SurveyRow {
    pub fn challenger_win_rate(&self) -> f64 {
        self.stats.knight2_win_rate()
    }

    pub fn challenger_avg(&self) -> f64 {
        self.stats.avg_moves(Knight::Second)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SurveyResult {
    pub baseline: String,
    /// Rows in challenger order
    pub rows: Vec<SurveyRow>,
    /// Row indices sorted by challenger win rate (descending)
    pub standings: Vec<usize>,
}

impl SurveyResult {
    /// Strongest challenger
    pub fn best(&self) -> Option<&SurveyRow> {
        self.standings.first().map(|&i| &self.rows[i])
    }

    pub fn ranked(&self) -> impl Iterator<Item = &SurveyRow> {
        self.standings.iter().map(|&i| &self.rows[i])
    }
}

/// Every catalogue heuristic plus the variants outside it and the combiner
pub fn default_challengers() -> Vec<Policy> {
    let mut challengers: Vec<Policy> = Heuristic::CATALOGUE.iter().copied().map(Policy::from).collect();
    challengers.push(Heuristic::Lookahead { plies: 2 }.into());
    challengers.push(Heuristic::CenterChebyshev.into());
    challengers.push(Heuristic::ThreePlyWarnsdorff.into());
    challengers.push(Policy::Meta(MetaHeuristic::default()));
    challengers
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run `config.trials` duels per challenger, knight 1 fixed to the
/// configured baseline (Level 1 orchestration)
pub fn run_survey(config: &ExperimentConfig, challengers: &[Policy]) -> Result<SurveyResult> {
    run_survey_with_callback(config, challengers, |_, _, _| {})
}

/// As `run_survey`, calling `on_trial(row, trial, outcome)` after each duel
pub fn run_survey_with_callback<F>(
    config: &ExperimentConfig,
    challengers: &[Policy],
    mut on_trial: F,
) -> Result<SurveyResult>
where
    F: FnMut(usize, u32, &DuelOutcome),
{
    let mut runner = DuelRunner::new(config)?;
    tracing::info!(
        "Starting survey: {} challengers x {} trials against {}",
        challengers.len(),
        config.trials,
        config.knight1,
    );

    let mut rows = Vec::with_capacity(challengers.len());
    for (index, challenger) in challengers.iter().enumerate() {
        let challenger = match config.meta_weights {
            Some(w) => challenger.clone().with_meta_weights(w),
            None => challenger.clone(),
        };
        let name = challenger.name();
        runner.set_policy(Knight::Second.index(), challenger);

        let mut report_trial = |done: u32, _total: u32, outcome: &DuelOutcome| on_trial(index, done, outcome);
        let stats = run_batch(&mut runner, config.trials, &mut report_trial)?;
        tracing::info!(
            "{}: wins {:.1}% / draws {:.1}% / losses {:.1}%",
            name,
            stats.knight2_win_rate() * 100.0,
            stats.draw_rate() * 100.0,
            stats.knight1_win_rate() * 100.0,
        );
        rows.push(SurveyRow { index, name, stats });
    }

    let standings = compute_standings(&rows);
    Ok(SurveyResult {
        baseline: config.knight1.name(),
        rows,
        standings,
    })
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

fn compute_standings(rows: &[SurveyRow]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        rows[b]
            .challenger_win_rate()
            .partial_cmp(&rows[a].challenger_win_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}
