//! Configuration types for experiments
//!
//! Level 4 - Utilities and configuration

use std::path::Path;

use anyhow::Context;
use knightduel_core::{
    Board, CrossingRule, Error, Heuristic, MetaWeights, Policy, Square, TieBreak, TurnModel,
    DEFAULT_BOARD_SIZE,
};
use serde::{Deserialize, Serialize};

/// Two distinct starts are the minimum a duel needs
pub const MIN_BOARD_SIZE: u8 = 2;

/// Duel experiment configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Board dimension N
    pub board_size: u8,
    /// Number of independent trials
    pub trials: u32,
    /// Policy for knight 1
    pub knight1: Policy,
    /// Policy for knight 2
    pub knight2: Policy,
    /// Tie-break strategy shared by both knights
    pub tie_break: TieBreak,
    /// Alternating or simultaneous turns
    pub turn_model: TurnModel,
    /// Whether drawn segments block later moves
    pub crossing_rule: CrossingRule,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Fixed start squares; random distinct starts when absent
    pub starts: Option<(Square, Square)>,
    /// Weights for any meta-heuristic policy
    pub meta_weights: Option<MetaWeights>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            trials: 1000,
            knight1: Policy::Heuristic(Heuristic::MaxMobility),
            knight2: Policy::Heuristic(Heuristic::Random),
            tie_break: TieBreak::default(),
            turn_model: TurnModel::default(),
            crossing_rule: CrossingRule::default(),
            seed: None,
            starts: None,
            meta_weights: None,
        }
    }
}

impl ExperimentConfig {
    /// Create config pitting two policies against each other
    pub fn new(knight1: Policy, knight2: Policy) -> Self {
        Self {
            knight1,
            knight2,
            ..Default::default()
        }
    }

    /// Load a JSON config; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn with_board_size(mut self, board_size: u8) -> Self {
        self.board_size = board_size;
        self
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_turn_model(mut self, turn_model: TurnModel) -> Self {
        self.turn_model = turn_model;
        self
    }

    pub fn with_crossing_rule(mut self, crossing_rule: CrossingRule) -> Self {
        self.crossing_rule = crossing_rule;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_starts(mut self, first: Square, second: Square) -> Self {
        self.starts = Some((first, second));
        self
    }

    pub fn with_meta_weights(mut self, weights: MetaWeights) -> Self {
        self.meta_weights = Some(weights);
        self
    }

    /// Check everything that could fail before the first trial
    pub fn validate(&self) -> Result<Board, Error> {
        if self.board_size < MIN_BOARD_SIZE {
            return Err(Error::BoardTooSmall(self.board_size, MIN_BOARD_SIZE));
        }
        let board = Board::new(self.board_size)?;
        if self.trials == 0 {
            return Err(Error::NoTrials);
        }
        if let Some((first, second)) = self.starts {
            board.check(first)?;
            board.check(second)?;
            if first == second {
                return Err(Error::SameStart(first));
            }
        }
        Ok(board)
    }

    /// Both policies with meta weights applied
    pub fn policies(&self) -> [Policy; 2] {
        let apply = |p: &Policy| match self.meta_weights {
            Some(w) => p.clone().with_meta_weights(w),
            None => p.clone(),
        };
        [apply(&self.knight1), apply(&self.knight2)]
    }
}

/// Mirror-blockade experiment configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockadeConfig {
    pub board_size: u8,
    pub trials: u32,
    /// Plain knight graph by default; the non-crossing rule is optional
    pub crossing_rule: CrossingRule,
    pub seed: Option<u64>,
}

impl Default for BlockadeConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            trials: 5000,
            crossing_rule: CrossingRule::Free,
            seed: None,
        }
    }
}

impl BlockadeConfig {
    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<Board, Error> {
        if self.board_size < MIN_BOARD_SIZE {
            return Err(Error::BoardTooSmall(self.board_size, MIN_BOARD_SIZE));
        }
        let board = Board::new(self.board_size)?;
        if self.trials == 0 {
            return Err(Error::NoTrials);
        }
        Ok(board)
    }
}
