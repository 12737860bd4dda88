//! Survey command - every challenger against one baseline
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: parse_challengers(), report_results()
//! - Level 3: table formatting

use anyhow::{Context, Result};
use clap::Args;

use knightduel_core::{Knight, Policy};
use knightduel_tournament::{default_challengers, run_survey_with_callback, SurveyResult};

use crate::duel_cmd::{percent, progress_bar, ExperimentArgs};

#[derive(Args)]
pub struct SurveyArgs {
    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Comma-separated challenger policies (default: the full catalogue and meta)
    #[arg(long, value_delimiter = ',')]
    pub challengers: Vec<Policy>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SurveyArgs, seed: Option<u64>) -> Result<()> {
    let config = args.experiment.build_config(seed)?;
    let challengers = parse_challengers(args.challengers);
    tracing::info!(
        "Survey: {} challengers against {}, {} trials each",
        challengers.len(),
        config.knight1,
        config.trials
    );

    let total = challengers.len() as u64 * config.trials as u64;
    let pb = progress_bar(total, !args.json);
    let trials = config.trials as u64;
    let result = run_survey_with_callback(&config, &challengers, |row, done, _| {
        pb.set_position(row as u64 * trials + done as u64)
    })
    .context("Survey failed")?;
    pb.finish_and_clear();

    report_results(&result, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn parse_challengers(given: Vec<Policy>) -> Vec<Policy> {
    if given.is_empty() {
        default_challengers()
    } else {
        given
    }
}

fn report_results(result: &SurveyResult, json: bool) -> Result<()> {
    if json {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            generated_at: String,
            #[serde(flatten)]
            result: &'a SurveyResult,
        }
        let output = JsonOutput {
            generated_at: chrono::Utc::now().to_rfc3339(),
            result,
        };
        println!("{}", serde_json::to_string_pretty(&output).context("Failed to serialize survey")?);
        return Ok(());
    }

    println!("\n=== Survey against {} ===", result.baseline);
    println!(
        "{:<4} {:<22} {:>8} {:>8} {:>8} {:>9} {:>9}",
        "#", "Challenger", "Win", "Draw", "Loss", "Own avg", "Base avg"
    );
    for (rank, row) in result.ranked().enumerate() {
        let s = &row.stats;
        println!(
            "{:<4} {:<22} {:>8} {:>8} {:>8} {:>9.2} {:>9.2}",
            rank + 1,
            row.name,
            percent(s.knight2_win_rate()),
            percent(s.draw_rate()),
            percent(s.knight1_win_rate()),
            s.avg_moves(Knight::Second),
            s.avg_moves(Knight::First)
        );
    }
    if let Some(best) = result.best() {
        println!("\nBest challenger: {} ({} wins)", best.name, percent(best.challenger_win_rate()));
    }
    Ok(())
}
