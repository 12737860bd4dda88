//! Duel command - many trials between two policies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_trials(), report_results()
//! - Level 3: print_text_results(), print_json_results()
//! - Level 4: argument types, progress and formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use knightduel_core::{CrossingRule, DuelResult, Knight, Policy, Square, TieBreak, TurnModel};
use knightduel_tournament::{run_trials_with_callback, ExperimentConfig, TrialReport};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Experiment settings shared by `duel` and `survey`; flags override the
/// config file
#[derive(Args, Clone, Debug)]
pub struct ExperimentArgs {
    /// Experiment config JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board dimension N
    #[arg(long)]
    pub board_size: Option<u8>,

    /// Number of trials
    #[arg(long)]
    pub trials: Option<u32>,

    /// Knight 1 policy (e.g. max-mobility, lookahead3, meta)
    #[arg(long)]
    pub knight1: Option<Policy>,

    /// Knight 2 policy
    #[arg(long)]
    pub knight2: Option<Policy>,

    /// Tie-break strategy (first, random, min-degree, least-used, ...)
    #[arg(long)]
    pub tie_break: Option<TieBreak>,

    /// Turn model: alternating or simultaneous
    #[arg(long)]
    pub turn_model: Option<TurnModel>,

    /// Let segments cross (plain knight graph)
    #[arg(long)]
    pub allow_crossing: bool,

    /// Fixed start for knight 1, as r,c
    #[arg(long, requires = "start2")]
    pub start1: Option<Square>,

    /// Fixed start for knight 2, as r,c
    #[arg(long, requires = "start1")]
    pub start2: Option<Square>,
}

impl ExperimentArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn build_config(&self, seed: Option<u64>) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let config = ExperimentConfig::load(path)?;
                tracing::debug!("Loaded config: {}", path.display());
                config
            }
            None => ExperimentConfig::default(),
        };
        if let Some(n) = self.board_size {
            config.board_size = n;
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(p) = &self.knight1 {
            config.knight1 = p.clone();
        }
        if let Some(p) = &self.knight2 {
            config.knight2 = p.clone();
        }
        if let Some(tb) = self.tie_break {
            config.tie_break = tb;
        }
        if let Some(tm) = self.turn_model {
            config.turn_model = tm;
        }
        if self.allow_crossing {
            config.crossing_rule = CrossingRule::Free;
        }
        if let (Some(a), Some(b)) = (self.start1, self.start2) {
            config.starts = Some((a, b));
        }
        if seed.is_some() {
            config.seed = seed;
        }
        config.validate().context("Invalid experiment configuration")?;
        Ok(config)
    }
}

#[derive(Args)]
pub struct DuelArgs {
    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run duel command
///
/// This function reads like a table of contents:
/// 1. Build and validate the configuration
/// 2. Play every trial
/// 3. Report results
pub fn run(args: DuelArgs, seed: Option<u64>) -> Result<()> {
    let config = args.experiment.build_config(seed)?;
    let report = play_trials(&config, !args.json)?;
    report_results(&report, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_trials(config: &ExperimentConfig, show_progress: bool) -> Result<TrialReport> {
    let pb = progress_bar(config.trials as u64, show_progress);
    let report = run_trials_with_callback(config, |done, _, _| pb.set_position(done as u64))
        .context("Trial run failed")?;
    pb.finish_and_clear();
    Ok(report)
}

fn report_results(report: &TrialReport, json: bool) -> Result<()> {
    if json {
        print_json_results(report)
    } else {
        print_text_results(report);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn print_json_results(report: &TrialReport) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        generated_at: String,
        knight1_avg: f64,
        knight2_avg: f64,
        knight1_win_rate: f64,
        knight2_win_rate: f64,
        draw_rate: f64,
        #[serde(flatten)]
        report: &'a TrialReport,
    }

    let s = &report.stats;
    let output = JsonOutput {
        generated_at: chrono::Utc::now().to_rfc3339(),
        knight1_avg: report.knight1_avg(),
        knight2_avg: report.knight2_avg(),
        knight1_win_rate: s.knight1_win_rate(),
        knight2_win_rate: s.knight2_win_rate(),
        draw_rate: s.draw_rate(),
        report,
    };
    let json = serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

fn print_text_results(report: &TrialReport) {
    let s = &report.stats;
    let c = &report.config;

    println!("\n=== Duel Results ===");
    println!(
        "{} vs {} | {}x{} | {} | {} | tie-break {}",
        report.knight1,
        report.knight2,
        c.board_size,
        c.board_size,
        c.turn_model,
        c.crossing_rule,
        c.tie_break
    );
    println!("Trials:        {}", s.trials);
    println!("Knight 1 wins: {} ({})", s.knight1_wins, percent(s.knight1_win_rate()));
    println!("Knight 2 wins: {} ({})", s.knight2_wins, percent(s.knight2_win_rate()));
    println!("Draws:         {} ({})", s.draws, percent(s.draw_rate()));
    println!("Avg moves:     {:.2} vs {:.2}", report.knight1_avg(), report.knight2_avg());

    println!("\nAverage moves by result:");
    for (label, result) in [
        ("knight 1 won", DuelResult::Knight1),
        ("knight 2 won", DuelResult::Knight2),
        ("draw", DuelResult::Draw),
    ] {
        let cat = s.category(result);
        println!(
            "  {:<13} {:>6} trials  {:>6.2} / {:>6.2}",
            label,
            cat.count,
            cat.avg_moves(Knight::First),
            cat.avg_moves(Knight::Second)
        );
    }

    println!("\n{:>6} {:>9} {:>9}", "Length", "Knight 1", "Knight 2");
    for len in all_lengths(report) {
        let k1 = s.histogram(Knight::First).get(&len).copied().unwrap_or(0);
        let k2 = s.histogram(Knight::Second).get(&len).copied().unwrap_or(0);
        println!("{:>6} {:>9} {:>9}", len, k1, k2);
    }

    println!("\n{:>7} {:>7} {:>8} {:>8} {:>8}", "Longest", "Trials", "K1 win", "K2 win", "Draw");
    for (len, bucket) in &s.by_longest {
        let total = bucket.total() as f64;
        println!(
            "{:>7} {:>7} {:>8} {:>8} {:>8}",
            len,
            bucket.total(),
            percent(bucket.knight1_wins as f64 / total),
            percent(bucket.knight2_wins as f64 / total),
            percent(bucket.draws as f64 / total)
        );
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Progress bar on stderr; hidden when output must stay machine-readable
pub fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trials ({eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Every length seen by either knight, ascending
fn all_lengths(report: &TrialReport) -> Vec<u32> {
    let s = &report.stats;
    let mut lengths: Vec<u32> = s
        .histogram(Knight::First)
        .keys()
        .chain(s.histogram(Knight::Second).keys())
        .copied()
        .collect();
    lengths.sort_unstable();
    lengths.dedup();
    lengths
}

// ============================================================================
// TESTS
// ============================================================================
