//! Blockade command - survival of the column-mirror strategy
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), select_scripts(), report_results()

use anyhow::{bail, Context, Result};
use clap::Args;

use knightduel_core::{CrossingRule, Square};
use knightduel_tournament::{run_blockades, BlockadeConfig, BlockadeReport, BlockadeScript};

#[derive(Args)]
pub struct BlockadeArgs {
    /// Board dimension N
    #[arg(long, default_value = "8")]
    pub board_size: u8,

    /// Trials per script
    #[arg(long, default_value = "5000")]
    pub trials: u32,

    /// Enforce the non-crossing rule (default: plain knight graph)
    #[arg(long)]
    pub non_crossing: bool,

    /// Built-in scripts to run (default: all)
    #[arg(long, value_delimiter = ',')]
    pub script: Vec<String>,

    /// Custom script as space-separated r,c squares; the first is the start
    #[arg(long, value_delimiter = ' ', num_args = 1..)]
    pub squares: Vec<Square>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: BlockadeArgs, seed: Option<u64>) -> Result<()> {
    let config = build_config(&args, seed);
    let scripts = select_scripts(&args)?;
    tracing::info!(
        "Blockade: {} scripts, {} trials each ({})",
        scripts.len(),
        config.trials,
        config.crossing_rule
    );
    let reports = run_blockades(&config, &scripts).context("Blockade experiment failed")?;
    report_results(&config, &reports, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &BlockadeArgs, seed: Option<u64>) -> BlockadeConfig {
    BlockadeConfig {
        board_size: args.board_size,
        trials: args.trials,
        crossing_rule: if args.non_crossing {
            CrossingRule::NonCrossing
        } else {
            CrossingRule::Free
        },
        seed,
    }
}

fn select_scripts(args: &BlockadeArgs) -> Result<Vec<BlockadeScript>> {
    let mut scripts = Vec::new();
    for name in &args.script {
        match BlockadeScript::by_name(name) {
            Some(script) => scripts.push(script),
            None => bail!("Unknown blockade script: {}", name),
        }
    }
    if !args.squares.is_empty() {
        scripts.push(BlockadeScript::new("custom", args.squares.clone()));
    }
    if scripts.is_empty() {
        scripts = BlockadeScript::builtin();
    }
    Ok(scripts)
}

fn report_results(config: &BlockadeConfig, reports: &[BlockadeReport], json: bool) -> Result<()> {
    if json {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            generated_at: String,
            config: &'a BlockadeConfig,
            reports: &'a [BlockadeReport],
        }
        let output = JsonOutput {
            generated_at: chrono::Utc::now().to_rfc3339(),
            config,
            reports,
        };
        println!("{}", serde_json::to_string_pretty(&output).context("Failed to serialize reports")?);
        return Ok(());
    }

    println!(
        "\n=== Mirror Blockade ({}x{}, {}, {} trials) ===",
        config.board_size,
        config.board_size,
        config.crossing_rule,
        config.trials
    );
    println!("{:<20} {:>10} {:>8}", "Script", "Mean turn", "Longest");
    for report in reports {
        println!(
            "{:<20} {:>10.2} {:>8}",
            report.script.name,
            report.mean_break_turn,
            report.longest()
        );
    }
    Ok(())
}
