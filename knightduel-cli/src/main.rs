//! KNIGHTDUEL CLI - Command-line interface
//!
//! Commands:
//! - duel: Run a batch of duels between two policies
//! - survey: Pit every heuristic against one baseline
//! - blockade: Measure how long a mirror strategy survives
//! - trace: Play and print one duel

mod blockade_cmd;
mod duel_cmd;
mod survey_cmd;
mod trace_cmd;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "knightduel")]
#[command(about = "Non-crossing knight duel simulator")]
struct Cli {
    /// Random seed for reproducible runs (omit for a nondeterministic run)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of duels and report length statistics
    Duel(duel_cmd::DuelArgs),
    /// Run one batch per challenger heuristic against a baseline
    Survey(survey_cmd::SurveyArgs),
    /// Run the mirror-blockade experiment
    Blockade(blockade_cmd::BlockadeArgs),
    /// Play a single duel and draw the board
    Trace(trace_cmd::TraceArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Duel(args) => duel_cmd::run(args, cli.seed),
        Commands::Survey(args) => survey_cmd::run(args, cli.seed),
        Commands::Blockade(args) => blockade_cmd::run(args, cli.seed),
        Commands::Trace(args) => trace_cmd::run(args, cli.seed),
    }
}

/// RUST_LOG wins; otherwise the level follows -v
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
