//! Trace command - play one duel and print it

use anyhow::{Context, Result};
use clap::Args;

use knightduel_core::{Board, DuelOutcome, Square};
use knightduel_tournament::DuelRunner;

use crate::duel_cmd::ExperimentArgs;

#[derive(Args)]
pub struct TraceArgs {
    /// Experiment settings; the trial count is ignored
    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Output the duel as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TraceArgs, seed: Option<u64>) -> Result<()> {
    let mut config = args.experiment.build_config(seed)?;
    config.trials = 1;

    let mut runner = DuelRunner::new(&config).context("Invalid experiment configuration")?;
    let board = *runner.board();
    let outcome = runner.play_duel().context("Duel failed")?;
    tracing::debug!("Traced duel: {:?} after {} rounds", outcome.result, outcome.longest());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome).context("Failed to serialize duel")?);
        return Ok(());
    }

    println!(
        "{} ({}) vs {} ({}) | {} | {:?}",
        config.knight1,
        outcome.moves[0],
        config.knight2,
        outcome.moves[1],
        outcome.turn_model,
        outcome.result
    );
    println!("Knight 1: {}", format_path(&outcome.paths[0]));
    println!("Knight 2: {}", format_path(&outcome.paths[1]));
    println!();
    print!("{}", render(&board, &outcome));
    Ok(())
}

fn format_path(path: &[Square]) -> String {
    path.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ")
}

/// `1`/`2` mark each knight's path, `A`/`B` its final square
fn render(board: &Board, outcome: &DuelOutcome) -> String {
    let n = board.size() as usize;
    let mut grid = vec![vec!['.'; n]; n];
    for (path, (trail, head)) in outcome.paths.iter().zip([('1', 'A'), ('2', 'B')]) {
        for sq in path {
            grid[sq.row as usize][sq.col as usize] = trail;
        }
        if let Some(last) = path.last() {
            grid[last.row as usize][last.col as usize] = head;
        }
    }

    let mut out = String::new();
    for row in grid {
        let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
