//! Mirror-blockade experiment
//!
//! Player 1 walks a scripted sequence of squares, then random legal moves.
//! Player 2 starts on the column reflection of player 1's start and answers
//! every move with its reflection `(r, N-1-c)`. A trial counts the turns the
//! mirror survives.
//!
//! Level 1 - Orchestration and Level 3 - Steps

use std::collections::BTreeMap;

use knightduel_core::{is_legal, legal_moves, Board, CrossingRule, Error, Field, Result, Square};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::BlockadeConfig;
use crate::duel_runner::create_rng;

/// A named opening for player 1; the first square is the start
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockadeScript {
    pub name: String,
    pub squares: Vec<Square>,
}

impl BlockadeScript {
    pub fn new(name: impl Into<String>, squares: Vec<Square>) -> Self {
        Self {
            name: name.into(),
            squares,
        }
    }

    /// The four 8x8 sequences
    pub fn builtin() -> Vec<BlockadeScript> {
        let script = |name: &str, squares: &[(u8, u8)]| {
            BlockadeScript::new(name, squares.iter().map(|&(r, c)| Square::new(r, c)).collect())
        };
        vec![
            script("bridge-block", &[(3, 3), (4, 5), (5, 3)]),
            script("parity-flip-loop", &[(2, 2), (4, 3), (3, 5), (5, 4)]),
            script("corridor-cutting", &[(1, 2), (3, 3), (5, 2), (7, 3)]),
            script("sacrificial-choke", &[(3, 4), (4, 6), (2, 5), (1, 3)]),
        ]
    }

    pub fn by_name(name: &str) -> Option<BlockadeScript> {
        let key = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::builtin().into_iter().find(|s| s.name == key)
    }

    /// Non-empty, on the board, and the start differs from its reflection
    pub fn validate(&self, board: &Board) -> Result<()> {
        let start = *self.squares.first().ok_or(Error::EmptyScript)?;
        for &sq in &self.squares {
            board.check(sq)?;
        }
        if board.reflect_columns(start) == start {
            return Err(Error::SelfMirroringStart(start));
        }
        Ok(())
    }
}

/// Survival statistics for one script
#[derive(Clone, Debug, Serialize)]
pub struct BlockadeReport {
    pub script: BlockadeScript,
    pub trials: u32,
    /// Mean number of mirrored turns before the mirror broke
    pub mean_break_turn: f64,
    /// Break turn -> number of trials
    pub histogram: BTreeMap<u32, u32>,
}

impl BlockadeReport {
    pub fn longest(&self) -> u32 {
        self.histogram.keys().next_back().copied().unwrap_or(0)
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run every script for `config.trials` trials, one generator for the run
pub fn run_blockades(config: &BlockadeConfig, scripts: &[BlockadeScript]) -> Result<Vec<BlockadeReport>> {
    let board = config.validate()?;
    for script in scripts {
        script.validate(&board)?;
    }
    if config.seed.is_none() {
        tracing::warn!("No seed given: trial sequence is nondeterministic");
    }
    tracing::info!(
        "Starting blockade: {} scripts x {} trials on {}x{}",
        scripts.len(),
        config.trials,
        board.size(),
        board.size(),
    );

    let mut rng = create_rng(config.seed);
    let mut reports = Vec::with_capacity(scripts.len());
    for script in scripts {
        let mut histogram = BTreeMap::new();
        let mut total = 0u64;
        for _ in 0..config.trials {
            let broke_at = play_blockade(&board, script, config.crossing_rule, &mut rng)?;
            total += broke_at as u64;
            *histogram.entry(broke_at).or_insert(0) += 1;
        }
        let mean_break_turn = total as f64 / config.trials as f64;
        tracing::info!("{}: mirror breaks after {:.2} turns on average", script.name, mean_break_turn);
        reports.push(BlockadeReport {
            script: script.clone(),
            trials: config.trials,
            mean_break_turn,
            histogram,
        });
    }
    Ok(reports)
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Play one trial and return the number of turns the mirror held
pub fn play_blockade(
    board: &Board,
    script: &BlockadeScript,
    rule: CrossingRule,
    rng: &mut ChaCha8Rng,
) -> Result<u32> {
    script.validate(board)?;
    let mut p1 = script.squares[0];
    let mut p2 = board.reflect_columns(p1);
    let mut field = Field::with_starts(rule, &[p1, p2]);
    let mut turn = 0u32;

    loop {
        let next = match script.squares.get(turn as usize + 1) {
            Some(&scripted) if is_legal(board, p1, scripted, &field) => scripted,
            Some(_) => return Ok(turn),
            None => match legal_moves(board, p1, &field).choose(rng) {
                Some(&mv) => mv,
                None => return Ok(turn),
            },
        };
        field.record_move(p1, next);
        p1 = next;

        let answer = board.reflect_columns(p1);
        if !is_legal(board, p2, answer, &field) {
            return Ok(turn);
        }
        field.record_move(p2, answer);
        p2 = answer;
        turn += 1;
    }
}
